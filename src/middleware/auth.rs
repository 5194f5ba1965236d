// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware and token issuance.
//!
//! Login issues an access/refresh token pair. The `token_use` claim keeps
//! the two apart: only access tokens pass the middleware, only refresh
//! tokens are accepted by the refresh endpoint.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Access token lifetime: 1 hour.
const ACCESS_TOKEN_TTL_SECS: usize = 60 * 60;
/// Refresh token lifetime: 30 days.
const REFRESH_TOKEN_TTL_SECS: usize = 30 * 24 * 60 * 60;

pub const TOKEN_USE_ACCESS: &str = "access";
pub const TOKEN_USE_REFRESH: &str = "refresh";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Token kind: "access" or "refresh"
    pub token_use: String,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        _ => return Err(AppError::Unauthorized),
    };

    let claims = decode_token(token, &state.config.jwt_signing_key)?;

    // Refresh tokens must not grant API access.
    if claims.token_use != TOKEN_USE_ACCESS {
        return Err(AppError::InvalidToken);
    }

    let auth_user = AuthUser {
        username: claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Decode and validate a JWT, checking signature and expiry.
pub fn decode_token(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Create a signed token of the given kind for a user session.
pub fn create_token(username: &str, token_use: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let ttl = match token_use {
        TOKEN_USE_REFRESH => REFRESH_TOKEN_TTL_SECS,
        _ => ACCESS_TOKEN_TTL_SECS,
    };

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: username.to_string(),
        iat: now,
        exp: now + ttl,
        token_use: token_use.to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
