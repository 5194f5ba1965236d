// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Reward model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored reward record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    /// Reward ID (also used as document ID)
    pub id: u64,
    /// Reward title
    pub title: String,
    /// Points required to redeem this reward
    #[serde(default)]
    pub points_needed: i64,
}

/// Redemption membership record (user × reward join).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRedemption {
    /// Username of the redeeming user
    pub username: String,
    /// Redeemed reward ID
    pub reward_id: u64,
    /// Reward title at redemption time
    pub title: String,
    /// Points debited for this redemption
    pub points_spent: i64,
    /// When the redemption was recorded
    pub redeemed_at: String,
}
