// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churn pipeline orchestrator.
//!
//! One run is Export -> Worker -> results metadata. The export must
//! complete (file fully on disk) before the worker is invoked; export
//! failure aborts the run before the worker starts. Concurrent runs are
//! not coordinated beyond the export's atomic-replace guarantee.

use crate::db::Db;
use crate::error::AppError;
use crate::services::export::{self, ChurnExporter, ExportError};
use crate::services::worker::{ScriptWorker, WorkerError};
use std::io;
use std::path::PathBuf;

/// Errors from a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Worker failed: {0}")]
    Worker(WorkerError),

    #[error("Worker timed out after {0}s")]
    WorkerTimeout(u64),

    #[error("Failed to record run metadata: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of a successful synchronous run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub total_users: usize,
    pub generation: u64,
}

/// Coordinates Export -> Worker -> result metadata.
///
/// Cheap to clone: the pool handle and paths are shared, which is what
/// lets `trigger` hand a copy to a background task.
#[derive(Clone)]
pub struct ChurnPipeline {
    exporter: ChurnExporter,
    worker: ScriptWorker,
    features_path: PathBuf,
    results_path: PathBuf,
}

impl ChurnPipeline {
    pub fn new(
        db: Db,
        worker: ScriptWorker,
        features_path: PathBuf,
        results_path: PathBuf,
    ) -> Self {
        Self {
            exporter: ChurnExporter::new(db, features_path.clone()),
            worker,
            features_path,
            results_path,
        }
    }

    /// Run the full pipeline and block until the worker exits.
    pub async fn run(&self) -> Result<PipelineSummary, PipelineError> {
        let outcome = self.exporter.export().await?;

        match self
            .worker
            .invoke(&self.features_path, &self.results_path)
            .await
        {
            Ok(()) => {}
            Err(WorkerError::TimedOut(d)) => {
                return Err(PipelineError::WorkerTimeout(d.as_secs()));
            }
            Err(e) => return Err(PipelineError::Worker(e)),
        }

        // Stamp the results with the generation of the export they came
        // from so the reader can detect stale predictions.
        export::write_meta(&self.results_path, &outcome.meta)?;

        tracing::info!(
            total_users = outcome.rows,
            generation = outcome.meta.generation,
            "Churn pipeline run complete"
        );

        Ok(PipelineSummary {
            total_users: outcome.rows,
            generation: outcome.meta.generation,
        })
    }

    /// Fire-and-forget run. The caller never waits and never sees a
    /// failure; outcomes are logged for operator visibility only.
    pub fn trigger(&self) {
        let pipeline = self.clone();
        tokio::spawn(async move {
            match pipeline.run().await {
                Ok(summary) => tracing::info!(
                    total_users = summary.total_users,
                    generation = summary.generation,
                    "Triggered churn pipeline finished"
                ),
                Err(e) => tracing::warn!(error = %e, "Triggered churn pipeline failed"),
            }
        });
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Export(ExportError::NoUsers) => {
                AppError::NotFound("No user data found".to_string())
            }
            PipelineError::Export(ExportError::QueryFailed(e)) => AppError::Database(e.to_string()),
            PipelineError::Export(ExportError::Io(e)) => {
                AppError::Internal(anyhow::anyhow!("Interchange write failed: {}", e))
            }
            PipelineError::Worker(e) => AppError::Worker(e.to_string()),
            PipelineError::WorkerTimeout(secs) => AppError::WorkerTimeout(secs),
            PipelineError::Io(e) => {
                AppError::Internal(anyhow::anyhow!("Run metadata write failed: {}", e))
            }
        }
    }
}
