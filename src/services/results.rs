// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churn result reader.
//!
//! Parses the results file the external worker writes: first record is
//! the field-name header, every following record maps positionally to
//! those names. Rows come back in file order.

use crate::error::AppError;
use crate::models::{ChurnResultRow, RunMeta};
use crate::services::export::meta_path;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from reading the results file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The pipeline has never completed successfully.
    #[error("No churn results found")]
    NotFound,

    #[error("Results file has no header row")]
    MissingHeader,

    #[error("Malformed results row at line {line}: expected {expected} fields, found {found}")]
    Malformed {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Results file unreadable: {0}")]
    Io(#[from] io::Error),
}

/// Parsed results plus a staleness flag.
#[derive(Debug, Clone)]
pub struct ChurnReport {
    pub rows: Vec<ChurnResultRow>,
    /// True when the results predate the latest feature export.
    pub stale: bool,
}

/// Reads and parses the worker's results file on demand.
#[derive(Clone)]
pub struct ResultReader {
    features_path: PathBuf,
    results_path: PathBuf,
}

impl ResultReader {
    pub fn new(features_path: PathBuf, results_path: PathBuf) -> Self {
        Self {
            features_path,
            results_path,
        }
    }

    pub async fn read(&self) -> Result<ChurnReport, ReadError> {
        let raw = match tokio::fs::read_to_string(&self.results_path).await {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ReadError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let rows = parse_results(&raw)?;
        let stale = self.is_stale().await;
        if stale {
            tracing::warn!(
                path = %self.results_path.display(),
                "Serving stale churn results (newer export exists)"
            );
        }

        Ok(ChurnReport { rows, stale })
    }

    /// Compare the run metadata of the results against the latest export.
    /// Missing metadata on both sides means nothing newer exists to
    /// compare against, so the results count as fresh.
    async fn is_stale(&self) -> bool {
        let features = load_meta(&self.features_path).await;
        let results = load_meta(&self.results_path).await;
        match (features, results) {
            (Some(f), Some(r)) => r.generation < f.generation,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

async fn load_meta(path: &Path) -> Option<RunMeta> {
    let bytes = tokio::fs::read(meta_path(path)).await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Parse header-plus-rows delimited text into result rows, preserving
/// both row order and the header's field order. Blank lines at the end of
/// the file are ignored.
pub fn parse_results(raw: &str) -> Result<Vec<ChurnResultRow>, ReadError> {
    let mut lines = raw.lines().enumerate();

    let header: Vec<&str> = match lines.next() {
        Some((_, line)) if !line.trim().is_empty() => line.split(',').collect(),
        _ => return Err(ReadError::MissingHeader),
    };

    let mut rows = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split(',').collect();
        if values.len() != header.len() {
            return Err(ReadError::Malformed {
                line: idx + 1,
                expected: header.len(),
                found: values.len(),
            });
        }
        rows.push(ChurnResultRow {
            fields: header
                .iter()
                .zip(values)
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });
    }

    Ok(rows)
}

impl From<ReadError> for AppError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::NotFound => AppError::NotFound("No churn results found".to_string()),
            other => AppError::ResultsParse(other.to_string()),
        }
    }
}
