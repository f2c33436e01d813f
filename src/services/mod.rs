// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod export;
pub mod pipeline;
pub mod results;
pub mod worker;

pub use export::{ChurnExporter, ExportError, ExportOutcome};
pub use pipeline::{ChurnPipeline, PipelineError, PipelineSummary};
pub use results::{ChurnReport, ReadError, ResultReader};
pub use worker::{ScriptWorker, WorkerError};
