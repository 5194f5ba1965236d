// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account records and point balances)
//! - Activities and Rewards (catalog records)
//! - Completion/Redemption memberships (join collections for queries)
//! - The points ledger (transactional balance mutations)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Activity, ActivityCompletion, Reward, RewardRedemption, User};
use crate::time_utils::now_rfc3339;
use firestore::errors::FirestoreError;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

/// Outcome of a completion attempt, resolved inside one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Balance credited and membership recorded.
    Completed { points_earned: i64, new_balance: i64 },
    ActivityNotFound,
    UserNotFound,
}

/// Outcome of a redemption attempt, resolved inside one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// Balance debited and membership recorded.
    Redeemed { points_spent: i64, new_balance: i64 },
    /// Balance below the reward threshold; nothing was written.
    InsufficientPoints { balance: i64, needed: i64 },
    RewardNotFound,
    UserNotFound,
}

/// Counter document for ID allocation.
#[derive(Debug, Serialize, Deserialize)]
struct IdCounter {
    next: u64,
}

/// Document ID for a completion membership record.
///
/// Combines activity ID and username so repeated completions land on the
/// same document (idempotent at the membership level).
fn completion_doc_id(activity_id: u64, username: &str) -> String {
    format!("{}_{}", activity_id, urlencoding::encode(username))
}

/// Document ID for a redemption membership record.
fn redemption_doc_id(reward_id: u64, username: &str) -> String {
    format!("{}_{}", reward_id, urlencoding::encode(username))
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by username.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(username)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user (fails if the username is already taken).
    ///
    /// The document ID is the username, so uniqueness is enforced by the
    /// create-only insert.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.username)
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => AppError::Validation(
                    "A user with that username already exists.".to_string(),
                ),
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.username)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get an activity by ID.
    pub async fn get_activity(&self, activity_id: u64) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&activity_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all activities, ordered by ID.
    pub async fn list_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update an activity record.
    pub async fn set_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(activity.id.to_string())
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Reward Operations ───────────────────────────────────────

    /// Get a reward by ID.
    pub async fn get_reward(&self, reward_id: u64) -> Result<Option<Reward>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REWARDS)
            .obj()
            .one(&reward_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all rewards, ordered by ID.
    pub async fn list_rewards(&self) -> Result<Vec<Reward>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REWARDS)
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a reward record.
    pub async fn set_reward(&self, reward: &Reward) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REWARDS)
            .document_id(reward.id.to_string())
            .object(reward)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Membership Queries ──────────────────────────────────────

    /// Get all completion records for a user.
    pub async fn get_completions_for_user(
        &self,
        username: &str,
    ) -> Result<Vec<ActivityCompletion>, AppError> {
        let username = username.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_COMPLETIONS)
            .filter(move |q| q.for_all([q.field("username").eq(username.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a single completion membership record, if present.
    pub async fn get_completion(
        &self,
        activity_id: u64,
        username: &str,
    ) -> Result<Option<ActivityCompletion>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITY_COMPLETIONS)
            .obj()
            .one(&completion_doc_id(activity_id, username))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a single redemption membership record, if present.
    pub async fn get_redemption(
        &self,
        reward_id: u64,
        username: &str,
    ) -> Result<Option<RewardRedemption>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REWARD_REDEMPTIONS)
            .obj()
            .one(&redemption_doc_id(reward_id, username))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Points Ledger ───────────────────────────────────────────

    /// Atomically complete an activity: credit the user's balance and record
    /// the completion membership.
    ///
    /// Runs as a single Firestore read-write transaction. The user document
    /// is read within the transaction, so a concurrent mutation of the same
    /// balance aborts the commit and the transaction is retried with fresh
    /// data, preventing lost updates.
    ///
    /// Repeating a completion credits the balance again; only the membership
    /// record is idempotent (the upsert lands on the same document).
    pub async fn complete_activity(
        &self,
        username: &str,
        activity_id: u64,
    ) -> Result<CompletionOutcome, AppError> {
        let username = username.to_string();
        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let username = username.clone();
                async move {
                    let activity: Option<Activity> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::ACTIVITIES)
                        .obj()
                        .one(&activity_id.to_string())
                        .await?;

                    let Some(activity) = activity else {
                        return Ok(CompletionOutcome::ActivityNotFound);
                    };

                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&username)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(CompletionOutcome::UserNotFound);
                    };

                    user.points += activity.points;

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&username)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    let membership = ActivityCompletion {
                        username: username.clone(),
                        activity_id,
                        title: activity.title.clone(),
                        points: activity.points,
                        completed_at: now_rfc3339(),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::ACTIVITY_COMPLETIONS)
                        .document_id(completion_doc_id(activity_id, &username))
                        .object(&membership)
                        .add_to_transaction(transaction)?;

                    Ok(CompletionOutcome::Completed {
                        points_earned: activity.points,
                        new_balance: user.points,
                    })
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Completion transaction failed: {}", e)))?;

        if let CompletionOutcome::Completed {
            points_earned,
            new_balance,
        } = outcome
        {
            tracing::info!(
                username = %username,
                activity_id,
                points_earned,
                new_balance,
                "Activity completed"
            );
        }

        Ok(outcome)
    }

    /// Atomically redeem a reward: debit the user's balance and record the
    /// redemption membership.
    ///
    /// The balance check and the debit happen inside one transaction, so two
    /// concurrent redemptions cannot both pass the check against the same
    /// balance. An insufficient balance commits nothing.
    ///
    /// Repeating a redemption debits the balance again when it still covers
    /// the threshold; the membership record is idempotent.
    pub async fn redeem_reward(
        &self,
        username: &str,
        reward_id: u64,
    ) -> Result<RedemptionOutcome, AppError> {
        let username = username.to_string();
        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let username = username.clone();
                async move {
                    let reward: Option<Reward> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::REWARDS)
                        .obj()
                        .one(&reward_id.to_string())
                        .await?;

                    let Some(reward) = reward else {
                        return Ok(RedemptionOutcome::RewardNotFound);
                    };

                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&username)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(RedemptionOutcome::UserNotFound);
                    };

                    if user.points < reward.points_needed {
                        return Ok(RedemptionOutcome::InsufficientPoints {
                            balance: user.points,
                            needed: reward.points_needed,
                        });
                    }

                    user.points -= reward.points_needed;

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&username)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    let membership = RewardRedemption {
                        username: username.clone(),
                        reward_id,
                        title: reward.title.clone(),
                        points_spent: reward.points_needed,
                        redeemed_at: now_rfc3339(),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::REWARD_REDEMPTIONS)
                        .document_id(redemption_doc_id(reward_id, &username))
                        .object(&membership)
                        .add_to_transaction(transaction)?;

                    Ok(RedemptionOutcome::Redeemed {
                        points_spent: reward.points_needed,
                        new_balance: user.points,
                    })
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Redemption transaction failed: {}", e)))?;

        if let RedemptionOutcome::Redeemed {
            points_spent,
            new_balance,
        } = outcome
        {
            tracing::info!(
                username = %username,
                reward_id,
                points_spent,
                new_balance,
                "Reward redeemed"
            );
        }

        Ok(outcome)
    }

    // ─── ID Allocation ───────────────────────────────────────────

    /// Allocate the next ID for an entity kind.
    ///
    /// The counter document is read and advanced inside a transaction so
    /// concurrent allocations never hand out the same ID.
    pub async fn next_id(&self, kind: &str) -> Result<u64, AppError> {
        let kind = kind.to_string();
        self.get_client()?
            .run_transaction(|db, transaction| {
                let kind = kind.clone();
                async move {
                    let counter: Option<IdCounter> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::COUNTERS)
                        .obj()
                        .one(&kind)
                        .await?;

                    let allocated = counter.map(|c| c.next).unwrap_or(1);

                    db.fluent()
                        .update()
                        .in_col(collections::COUNTERS)
                        .document_id(&kind)
                        .object(&IdCounter {
                            next: allocated + 1,
                        })
                        .add_to_transaction(transaction)?;

                    Ok(allocated)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("ID allocation failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_doc_ids_are_stable() {
        assert_eq!(completion_doc_id(7, "alice"), "7_alice");
        assert_eq!(redemption_doc_id(3, "alice"), "3_alice");
    }

    #[test]
    fn test_membership_doc_ids_encode_unsafe_names() {
        // Usernames with separators must not collide with other documents.
        assert_eq!(completion_doc_id(7, "a/b c"), "7_a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_offline_mode_errors() {
        let db = FirestoreDb::new_mock();
        let err = db.get_user("alice").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
