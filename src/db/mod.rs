//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    pub const REWARDS: &str = "rewards";
    /// Membership set: which users completed which activities
    pub const ACTIVITY_COMPLETIONS: &str = "activity_completions";
    /// Membership set: which users redeemed which rewards
    pub const REWARD_REDEMPTIONS: &str = "reward_redemptions";
    /// ID allocation counters (one document per entity kind)
    pub const COUNTERS: &str = "counters";
}
