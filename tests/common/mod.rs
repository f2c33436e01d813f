// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use churnwatch::config::Config;
use churnwatch::db::Db;
use churnwatch::routes::create_router;
use churnwatch::services::{ChurnPipeline, ResultReader, ScriptWorker};
use churnwatch::AppState;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("CHURNWATCH_TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("Skipping: CHURNWATCH_TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the configured test database.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let url = std::env::var("CHURNWATCH_TEST_DATABASE_URL").expect("test database URL");
    Db::connect(&url).await.expect("connect to test database")
}

/// Lazy pool that fails only when a handler actually touches the
/// database. Lets router tests run without any server.
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    Db::connect_lazy("postgres://localhost/churnwatch_test").expect("lazy pool")
}

/// A worker that exits 0 without writing anything.
#[allow(dead_code)]
pub fn noop_worker() -> ScriptWorker {
    ScriptWorker::new("true", "", Duration::from_secs(5))
}

/// Build the app around the given database and worker, with interchange
/// files in a fresh temp dir. The TempDir must outlive the test.
#[allow(dead_code)]
pub fn build_app(db: Db, worker: ScriptWorker) -> (axum::Router, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::test_default();
    config.features_path = dir.path().join("churn_features.csv");
    config.results_path = dir.path().join("churn_results.csv");

    let pipeline = ChurnPipeline::new(
        db.clone(),
        worker,
        config.features_path.clone(),
        config.results_path.clone(),
    );
    let results = ResultReader::new(config.features_path.clone(), config.results_path.clone());

    let state = Arc::new(AppState {
        config,
        db,
        pipeline,
        results,
    });

    (create_router(state.clone()), state, dir)
}

/// Create a test app with an offline database and a no-op worker.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    build_app(test_db_offline(), noop_worker())
}

/// POST a JSON body to the given path.
#[allow(dead_code)]
pub fn json_post(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// GET request for the given path.
#[allow(dead_code)]
pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

/// Collect a response body as a string.
#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
