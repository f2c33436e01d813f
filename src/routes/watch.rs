// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Watch-history routes.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/watch/add", post(add_watch))
}

#[derive(Deserialize, Validate)]
pub struct AddWatchRequest {
    #[validate(required)]
    pub user_id: Option<i64>,
    #[validate(required, length(min = 1))]
    pub video_title: Option<String>,
    pub genre: Option<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Serialize)]
pub struct AddWatchResponse {
    pub success: bool,
    pub message: String,
}

/// Append a watch event, then fire the churn pipeline without waiting.
async fn add_watch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddWatchRequest>,
) -> Result<Json<AddWatchResponse>> {
    req.validate()
        .map_err(|_| AppError::BadRequest("Missing watch info".to_string()))?;
    let user_id = req.user_id.unwrap_or_default();
    let video_title = req.video_title.unwrap_or_default();
    let genre = req.genre.unwrap_or_default();
    let duration_minutes = req.duration_minutes.unwrap_or_default();

    state
        .db
        .add_watch_event(user_id, &video_title, &genre, duration_minutes)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    tracing::info!(user_id, video_title = %video_title, "Watch event logged");

    state.pipeline.trigger();

    Ok(Json(AddWatchResponse {
        success: true,
        message: "Watch logged successfully".to_string(),
    }))
}
