// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL access: user accounts, watch history, churn feature
//! aggregation.

use crate::models::{ChurnFeatureRow, User};
use sqlx::PgPool;

/// Owned connection pool, injected into each component at construction.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect eagerly, failing fast when the database is unreachable.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Connect lazily; the first query pays the connection cost. Used by
    /// tests that never touch the database.
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Raw pool handle, used by integration tests for schema setup.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (full_name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING id, full_name, email, password_hash, created_at",
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn add_watch_event(
        &self,
        user_id: i64,
        video_title: &str,
        genre: &str,
        duration_minutes: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO watch_history (user_id, video_title, genre, duration_minutes, watched_at) \
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(user_id)
        .bind(video_title)
        .bind(genre)
        .bind(duration_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Aggregate per-user watch statistics for the churn export.
    ///
    /// Left-outer join: users with no watch history still appear, with
    /// zeroed aggregates. Ordered by user id so repeated exports over
    /// unchanged data are byte-identical.
    pub async fn churn_features(&self) -> Result<Vec<ChurnFeatureRow>, sqlx::Error> {
        sqlx::query_as::<_, ChurnFeatureRow>(
            "SELECT \
                u.id AS user_id, \
                u.full_name, \
                u.email, \
                COUNT(w.id) AS num_videos_watched, \
                COALESCE(AVG(w.duration_minutes), 0)::double precision AS avg_watch_time_per_day, \
                COALESCE(FLOOR(MAX(EXTRACT(EPOCH FROM (NOW() - w.watched_at)) / 86400.0)), 0)::bigint \
                    AS last_login_days_ago, \
                0::bigint AS support_tickets, \
                6::bigint AS tenure_months, \
                0::bigint AS churn \
             FROM users u \
             LEFT JOIN watch_history w ON w.user_id = u.id \
             GROUP BY u.id, u.full_name, u.email \
             ORDER BY u.id",
        )
        .fetch_all(&self.pool)
        .await
    }
}
