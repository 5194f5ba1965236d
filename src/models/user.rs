//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Username (also used as document ID; unique)
    pub username: String,
    /// Email address (may be None if not provided at signup)
    pub email: Option<String>,
    /// Argon2 hash of the password (PHC string format)
    pub password_hash: String,
    /// Current point balance; mutated only by the ledger operations
    #[serde(default)]
    pub points: i64,
    /// When the account was created
    pub created_at: String,
}
