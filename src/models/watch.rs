// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Watch-history event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One watch-history record. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchEvent {
    pub id: i64,
    pub user_id: i64,
    pub video_title: String,
    pub genre: String,
    pub duration_minutes: i32,
    pub watched_at: DateTime<Utc>,
}
