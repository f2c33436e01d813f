// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod churn;
pub mod user;
pub mod watch;

pub use churn::{ChurnFeatureRow, ChurnResultRow, RunMeta};
pub use user::User;
pub use watch::WatchEvent;
