// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup and token issuance routes.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_token, decode_token, TOKEN_USE_ACCESS, TOKEN_USE_REFRESH};
use crate::models::User;
use crate::routes::DetailResponse;
use crate::services::password;
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/signup/", post(signup))
        .route("/api/signup", post(signup))
        .route("/api/token/", post(obtain_token_pair))
        .route("/api/token", post(obtain_token_pair))
        .route("/api/token/refresh/", post(refresh_token))
        .route("/api/token/refresh", post(refresh_token))
}

// ─── Signup ──────────────────────────────────────────────────

/// Signup request body. Missing fields deserialize to empty strings so
/// validation produces a 400 instead of a serializer rejection.
#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    password: String,
}

/// Create a new user account with a zero point balance.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<DetailResponse>)> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("Username and password are required.".to_string()))?;

    let password_hash = password::hash_password(&payload.password)?;

    let user = User {
        username: payload.username.clone(),
        email: payload.email.filter(|e| !e.is_empty()),
        password_hash,
        points: 0,
        created_at: now_rfc3339(),
    };

    state.db.insert_user(&user).await?;

    tracing::info!(username = %user.username, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DetailResponse::new("User created successfully.")),
    ))
}

// ─── Token Issuance ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Access/refresh token pair returned on login.
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Verify credentials and issue an access/refresh token pair.
async fn obtain_token_pair(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenPairResponse>> {
    let user = state
        .db
        .get_user(&payload.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let key = &state.config.jwt_signing_key;
    let access = create_token(&user.username, TOKEN_USE_ACCESS, key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token creation failed: {}", e)))?;
    let refresh = create_token(&user.username, TOKEN_USE_REFRESH, key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token creation failed: {}", e)))?;

    tracing::debug!(username = %user.username, "Issued token pair");

    Ok(Json(TokenPairResponse { access, refresh }))
}

// ─── Token Refresh ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh: String,
}

#[derive(Serialize)]
pub struct TokenRefreshResponse {
    pub access: String,
}

/// Exchange a valid refresh token for a new access token.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenRefreshResponse>> {
    let claims = decode_token(&payload.refresh, &state.config.jwt_signing_key)?;

    // Access tokens cannot be used to mint new access tokens.
    if claims.token_use != TOKEN_USE_REFRESH {
        return Err(AppError::InvalidToken);
    }

    let access = create_token(&claims.sub, TOKEN_USE_ACCESS, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token creation failed: {}", e)))?;

    Ok(Json(TokenRefreshResponse { access }))
}
