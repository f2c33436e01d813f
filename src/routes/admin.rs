// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: synchronous churn pipeline trigger and results serving.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::ChurnResultRow;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/run-churn", get(run_churn))
        .route("/admin/churn-data", get(churn_data))
}

#[derive(Serialize)]
pub struct RunChurnResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "totalUsers")]
    pub total_users: usize,
}

#[derive(Serialize)]
pub struct ChurnDataResponse {
    pub success: bool,
    /// True when a newer export exists than the one these results came from.
    pub stale: bool,
    pub data: Vec<ChurnResultRow>,
}

/// Run the full pipeline and block until the worker exits.
async fn run_churn(State(state): State<Arc<AppState>>) -> Result<Json<RunChurnResponse>> {
    let summary = state.pipeline.run().await?;
    Ok(Json(RunChurnResponse {
        success: true,
        message: "Churn analysis updated successfully".to_string(),
        total_users: summary.total_users,
    }))
}

/// Serve the latest parsed worker results.
async fn churn_data(State(state): State<Arc<AppState>>) -> Result<Json<ChurnDataResponse>> {
    let report = state.results.read().await?;
    tracing::debug!(rows = report.rows.len(), stale = report.stale, "Serving churn results");
    Ok(Json(ChurnDataResponse {
        success: true,
        stale: report.stale,
        data: report.rows,
    }))
}
