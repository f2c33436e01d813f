// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churnwatch: video-streaming demo backend with churn analytics.
//!
//! Provides signup/login, watch-history logging, and the churn pipeline
//! that exports per-user activity to a CSV interchange file, runs an
//! external predictive worker, and serves its results.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::{ChurnPipeline, ResultReader};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub pipeline: ChurnPipeline,
    pub results: ResultReader,
}
