// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churnwatch API Server
//!
//! Video-streaming demo backend: signup/login, watch-history logging, and
//! the churn analytics pipeline (feature export -> external model worker
//! -> results serving).

use churnwatch::{
    config::Config,
    db::Db,
    services::{ChurnPipeline, ResultReader, ScriptWorker},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting churnwatch API");

    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to connect to PostgreSQL");
    tracing::info!("Database pool ready");

    let worker = ScriptWorker::new(
        &config.worker_program,
        &config.worker_script,
        Duration::from_secs(config.worker_timeout_secs),
    );
    let pipeline = ChurnPipeline::new(
        db.clone(),
        worker,
        config.features_path.clone(),
        config.results_path.clone(),
    );
    let results = ResultReader::new(config.features_path.clone(), config.results_path.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        pipeline,
        results,
    });

    let app = churnwatch::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("churnwatch=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
