// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod reward;
pub mod user;

pub use activity::{Activity, ActivityCompletion};
pub use reward::{Reward, RewardRedemption};
pub use user::User;
