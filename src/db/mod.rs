// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (PostgreSQL via sqlx).
//!
//! The schema is an external collaborator; the expected tables are
//! `users (id, full_name, email UNIQUE, password_hash, created_at)` and
//! `watch_history (id, user_id, video_title, genre, duration_minutes,
//! watched_at)`.

pub mod postgres;

pub use postgres::Db;
