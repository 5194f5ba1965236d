// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use taskrewards::config::Config;
use taskrewards::db::FirestoreDb;
use taskrewards::middleware::auth::{create_token, TOKEN_USE_ACCESS};
use taskrewards::models::{Activity, Reward, User};
use taskrewards::routes::create_router;
use taskrewards::services::password;
use taskrewards::time_utils::now_rfc3339;
use taskrewards::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app around the given database connection.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState { config, db });

    (create_router(state.clone()), state)
}

/// Create a valid access token for a test user.
#[allow(dead_code)]
pub fn test_access_token(username: &str, signing_key: &[u8]) -> String {
    create_token(username, TOKEN_USE_ACCESS, signing_key).expect("Failed to create test token")
}

/// Seed a user with the given balance directly into the database.
#[allow(dead_code)]
pub async fn seed_user(db: &FirestoreDb, username: &str, points: i64) -> User {
    let user = User {
        username: username.to_string(),
        email: Some(format!("{}@example.com", username)),
        password_hash: password::hash_password("hunter2!").expect("hash"),
        points,
        created_at: now_rfc3339(),
    };
    db.upsert_user(&user).await.expect("Failed to seed user");
    user
}

/// Seed an activity worth the given points.
#[allow(dead_code)]
pub async fn seed_activity(db: &FirestoreDb, id: u64, points: i64) -> Activity {
    let activity = Activity {
        id,
        title: format!("Activity {}", id),
        description: "Seeded for tests".to_string(),
        points,
        image: None,
        time_hours: 1,
        weather: 0,
        star_rating: 4.0,
    };
    db.set_activity(&activity)
        .await
        .expect("Failed to seed activity");
    activity
}

/// Seed a reward with the given threshold.
#[allow(dead_code)]
pub async fn seed_reward(db: &FirestoreDb, id: u64, points_needed: i64) -> Reward {
    let reward = Reward {
        id,
        title: format!("Reward {}", id),
        points_needed,
    };
    db.set_reward(&reward).await.expect("Failed to seed reward");
    reward
}
