// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Duplicate unique key. Served as 400 to match the original API surface.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Worker timed out after {0}s")]
    WorkerTimeout(u64),

    #[error("Failed to read churn results: {0}")]
    ResultsParse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                Some("Invalid credentials".to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Worker(msg) => {
                tracing::error!(error = %msg, "Churn worker failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "worker_error",
                    Some(msg.clone()),
                )
            }
            AppError::WorkerTimeout(secs) => {
                tracing::error!(timeout_secs = secs, "Churn worker timed out");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "worker_timeout",
                    Some(format!("Worker timed out after {}s", secs)),
                )
            }
            AppError::ResultsParse(msg) => {
                tracing::error!(error = %msg, "Churn results unreadable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "results_parse_error",
                    Some(msg.clone()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
