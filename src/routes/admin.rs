// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog management routes (admin token required).
//!
//! These stand in for the administrative collaborator that curates the
//! activity and reward catalogs. They never touch the points ledger.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Activity, Reward};
use crate::AppState;

/// Admin routes (require the admin bearer token).
/// The admin middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/activities/", post(create_activity))
        .route("/admin/activities", post(create_activity))
        .route("/admin/rewards/", post(create_reward))
        .route("/admin/rewards", post(create_reward))
}

fn default_activity_points() -> i64 {
    1
}

#[derive(Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required."))]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_activity_points")]
    points: i64,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    time_hours: i64,
    #[serde(default)]
    weather: i64,
    #[serde(default)]
    star_rating: f64,
}

/// Create an activity with a freshly allocated ID.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.db.next_id("activities").await?;

    let activity = Activity {
        id,
        title: payload.title,
        description: payload.description,
        points: payload.points,
        image: payload.image,
        time_hours: payload.time_hours,
        weather: payload.weather,
        star_rating: payload.star_rating,
    };

    state.db.set_activity(&activity).await?;

    tracing::info!(id, title = %activity.title, "Activity created");

    Ok((StatusCode::CREATED, Json(activity)))
}

#[derive(Deserialize, Validate)]
pub struct CreateRewardRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required."))]
    title: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "points_needed must not be negative."))]
    points_needed: i64,
}

/// Create a reward with a freshly allocated ID.
async fn create_reward(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<Reward>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.db.next_id("rewards").await?;

    let reward = Reward {
        id,
        title: payload.title,
        points_needed: payload.points_needed,
    };

    state.db.set_reward(&reward).await?;

    tracing::info!(id, title = %reward.title, "Reward created");

    Ok((StatusCode::CREATED, Json(reward)))
}
