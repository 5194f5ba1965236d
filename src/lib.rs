// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TaskRewards: earn points by completing activities, spend them on rewards
//!
//! This crate provides the backend API for the gamified task tracker:
//! signup and token login, an activity catalog, a reward catalog, and the
//! points ledger connecting them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
