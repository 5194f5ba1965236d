// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin token middleware for the catalog management endpoints.
//!
//! Stands in for the administrative collaborator that curates activities
//! and rewards: a static bearer token, compared in constant time.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require the admin bearer token for `/admin/*` routes.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
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

    let expected = state.config.admin_token.as_bytes();
    if !bool::from(token.as_bytes().ct_eq(expected)) {
        tracing::warn!("Blocked admin request with invalid token");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
