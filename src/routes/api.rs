// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::firestore::{CompletionOutcome, RedemptionOutcome};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, Reward};
use crate::routes::DetailResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/my-account/", get(get_my_account))
        .route("/api/my-account", get(get_my_account))
        .route("/api/activities/", get(list_activities))
        .route("/api/activities", get(list_activities))
        .route(
            "/api/activities/{id}/",
            get(get_activity).post(complete_activity),
        )
        .route(
            "/api/activities/{id}",
            get(get_activity).post(complete_activity),
        )
        .route("/api/rewards/", get(list_rewards))
        .route("/api/rewards", get(list_rewards))
        .route("/api/rewards/{id}/", post(redeem_reward))
        .route("/api/rewards/{id}", post(redeem_reward))
}

// ─── Account ─────────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
pub struct AccountResponse {
    pub username: String,
    pub email: Option<String>,
    pub points: i64,
}

/// Get the calling user's account summary.
async fn get_my_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AccountResponse>> {
    let account = state
        .db
        .get_user(&user.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(AccountResponse {
        username: account.username,
        email: account.email,
        points: account.points,
    }))
}

// ─── Activities ──────────────────────────────────────────────

/// Activity as seen by a particular caller.
#[derive(Serialize, Clone, Debug)]
pub struct ActivityView {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub points: i64,
    pub image: Option<String>,
    pub time_hours: i64,
    pub weather: i64,
    pub star_rating: f64,
    /// Whether the calling user is in this activity's completed set
    pub completed: bool,
}

fn activity_view(activity: Activity, completed: bool) -> ActivityView {
    ActivityView {
        id: activity.id,
        title: activity.title,
        description: activity.description,
        points: activity.points,
        image: activity.image,
        time_hours: activity.time_hours,
        weather: activity.weather,
        star_rating: activity.star_rating,
        completed,
    }
}

/// List all activities, annotated with the caller's completion status.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityView>>> {
    let activities = state.db.list_activities().await?;
    let completions = state.db.get_completions_for_user(&user.username).await?;

    let completed_ids: HashSet<u64> = completions.iter().map(|c| c.activity_id).collect();

    let views = activities
        .into_iter()
        .map(|a| {
            let completed = completed_ids.contains(&a.id);
            activity_view(a, completed)
        })
        .collect();

    Ok(Json(views))
}

/// Get a single activity, annotated for the caller.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<Json<ActivityView>> {
    let activity = state
        .db
        .get_activity(activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found.".to_string()))?;

    let completed = state
        .db
        .get_completion(activity_id, &user.username)
        .await?
        .is_some();

    Ok(Json(activity_view(activity, completed)))
}

/// Mark an activity as completed by the caller, crediting its points.
async fn complete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(activity_id): Path<u64>,
) -> Result<Json<DetailResponse>> {
    match state.db.complete_activity(&user.username, activity_id).await? {
        CompletionOutcome::Completed { points_earned, .. } => Ok(Json(DetailResponse::new(
            format!("Activity completed! You earned {} points.", points_earned),
        ))),
        CompletionOutcome::ActivityNotFound => {
            Err(AppError::NotFound("Activity not found.".to_string()))
        }
        CompletionOutcome::UserNotFound => Err(AppError::NotFound("User not found.".to_string())),
    }
}

// ─── Rewards ─────────────────────────────────────────────────

/// Reward as seen by a particular caller.
#[derive(Serialize, Clone, Debug)]
pub struct RewardView {
    pub id: u64,
    pub title: String,
    pub points_needed: i64,
    /// Whether the caller's balance covers this reward
    pub can_purchase: bool,
    /// Suggested action label for the client
    pub action: String,
}

fn reward_view(reward: Reward, balance: i64) -> RewardView {
    let can_purchase = balance >= reward.points_needed;
    RewardView {
        id: reward.id,
        title: reward.title,
        points_needed: reward.points_needed,
        can_purchase,
        action: if can_purchase { "Redeem" } else { "Earn more" }.to_string(),
    }
}

/// List all rewards, annotated with the caller's purchasing power.
async fn list_rewards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RewardView>>> {
    let account = state
        .db
        .get_user(&user.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let rewards = state.db.list_rewards().await?;

    let views = rewards
        .into_iter()
        .map(|r| reward_view(r, account.points))
        .collect();

    Ok(Json(views))
}

/// Redeem a reward, debiting the caller's balance.
async fn redeem_reward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(reward_id): Path<u64>,
) -> Result<Json<DetailResponse>> {
    match state.db.redeem_reward(&user.username, reward_id).await? {
        RedemptionOutcome::Redeemed { .. } => Ok(Json(DetailResponse::new(
            "Reward redeemed successfully.",
        ))),
        RedemptionOutcome::InsufficientPoints { balance, needed } => {
            tracing::debug!(
                username = %user.username,
                reward_id,
                balance,
                needed,
                "Redemption rejected: insufficient points"
            );
            Err(AppError::InsufficientPoints)
        }
        RedemptionOutcome::RewardNotFound => {
            Err(AppError::NotFound("Reward not found.".to_string()))
        }
        RedemptionOutcome::UserNotFound => Err(AppError::NotFound("User not found.".to_string())),
    }
}
