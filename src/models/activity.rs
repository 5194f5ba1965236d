// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored activity record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    pub id: u64,
    /// Activity title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Points credited to a user on completion
    pub points: i64,
    /// Opaque image path/URL, not interpreted by the backend
    pub image: Option<String>,
    /// Estimated time to complete, in hours
    #[serde(default)]
    pub time_hours: i64,
    /// Weather indication code
    #[serde(default)]
    pub weather: i64,
    /// Star rating shown in the catalog
    #[serde(default)]
    pub star_rating: f64,
}

/// Completion membership record (user × activity join).
///
/// Document ID combines activity ID and username, so re-completing an
/// activity overwrites the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCompletion {
    /// Username of the completing user
    pub username: String,
    /// Completed activity ID
    pub activity_id: u64,
    /// Activity title at completion time
    pub title: String,
    /// Points credited for this completion
    pub points: i64,
    /// When the completion was recorded
    pub completed_at: String,
}
