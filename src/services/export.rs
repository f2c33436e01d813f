// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churn feature export stage.
//!
//! Aggregates per-user watch statistics and materializes them as the CSV
//! interchange file the external worker reads. Every run is a full
//! snapshot: the file is rebuilt from scratch and swapped into place
//! atomically so no concurrent reader ever observes a partial write.

use crate::db::Db;
use crate::models::{ChurnFeatureRow, RunMeta};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Errors from the export stage.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The user table is empty. Distinct from a transient query failure.
    #[error("No user data found")]
    NoUsers,

    #[error("Feature query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error("Failed to write interchange file: {0}")]
    Io(#[from] io::Error),
}

/// A successful export: how many rows were written and under which run
/// metadata.
#[derive(Debug, Clone, Copy)]
pub struct ExportOutcome {
    pub rows: usize,
    pub meta: RunMeta,
}

/// Queries churn features and writes the interchange file.
#[derive(Clone)]
pub struct ChurnExporter {
    db: Db,
    features_path: PathBuf,
}

impl ChurnExporter {
    pub fn new(db: Db, features_path: PathBuf) -> Self {
        Self { db, features_path }
    }

    /// Export all users' features, fully overwriting any prior file.
    pub async fn export(&self) -> Result<ExportOutcome, ExportError> {
        let rows = self.db.churn_features().await?;
        if rows.is_empty() {
            return Err(ExportError::NoUsers);
        }

        let meta = RunMeta::now();
        let body = render_csv(&rows);
        write_atomic(&self.features_path, body.as_bytes())?;
        write_meta(&self.features_path, &meta)?;

        tracing::info!(
            rows = rows.len(),
            generation = meta.generation,
            path = %self.features_path.display(),
            "Churn features exported"
        );

        Ok(ExportOutcome {
            rows: rows.len(),
            meta,
        })
    }
}

/// Render feature rows as delimited text: header row of column names, one
/// data row per user. String fields are sanitized so an embedded delimiter
/// cannot misalign columns.
pub fn render_csv(rows: &[ChurnFeatureRow]) -> String {
    let mut out = String::new();
    out.push_str(&ChurnFeatureRow::COLUMNS.join(","));
    out.push('\n');

    for row in rows {
        let line = format!(
            "{},{},{},{},{},{},{},{},{}\n",
            row.user_id,
            sanitize_field(&row.full_name),
            sanitize_field(&row.email),
            row.num_videos_watched,
            row.avg_watch_time_per_day,
            row.last_login_days_ago,
            row.support_tickets,
            row.tenure_months,
            row.churn,
        );
        out.push_str(&line);
    }

    out
}

/// Strip delimiter and record-separator characters from a string field.
pub fn sanitize_field(field: &str) -> String {
    field
        .chars()
        .filter(|c| !matches!(c, ',' | '\n' | '\r'))
        .collect()
}

/// Write `bytes` to `path` via a temp file in the same directory followed
/// by an atomic rename. A concurrent reader sees either the old file or
/// the complete new one, never a half-written state.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sidecar metadata path: `foo.csv` -> `foo.csv.meta.json`.
pub fn meta_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".meta.json");
    PathBuf::from(os)
}

/// Atomically record run metadata next to an interchange or results file.
pub fn write_meta(path: &Path, meta: &RunMeta) -> io::Result<()> {
    let bytes = serde_json::to_vec(meta).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    write_atomic(&meta_path(path), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: i64, name: &str, watched: i64, avg: f64) -> ChurnFeatureRow {
        ChurnFeatureRow {
            user_id,
            full_name: name.to_string(),
            email: format!("u{}@example.com", user_id),
            num_videos_watched: watched,
            avg_watch_time_per_day: avg,
            last_login_days_ago: 0,
            support_tickets: 0,
            tenure_months: 6,
            churn: 0,
        }
    }

    #[test]
    fn sanitize_strips_delimiters() {
        assert_eq!(sanitize_field("Doe, Jane\n"), "Doe Jane");
        assert_eq!(sanitize_field("plain"), "plain");
        assert_eq!(sanitize_field("a\r\nb,c"), "abc");
    }

    #[test]
    fn render_includes_header_and_zero_defaults() {
        let rows = vec![row(1, "Ann", 0, 0.0)];
        let csv = render_csv(&rows);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "user_id,full_name,email,num_videos_watched,avg_watch_time_per_day,\
             last_login_days_ago,support_tickets,tenure_months,churn"
        );
        assert_eq!(lines.next().unwrap(), "1,Ann,u1@example.com,0,0,0,0,6,0");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn render_is_deterministic() {
        let rows = vec![row(1, "Ann", 3, 12.5), row(2, "Bob", 0, 0.0)];
        assert_eq!(render_csv(&rows), render_csv(&rows));
    }

    #[test]
    fn render_sanitizes_embedded_commas() {
        let rows = vec![row(5, "Doe, Jane", 1, 1.0)];
        let csv = render_csv(&rows);
        let data = csv.lines().nth(1).unwrap();
        assert_eq!(data.split(',').count(), ChurnFeatureRow::COLUMNS.len());
        assert!(data.contains("Doe Jane"));
    }

    #[test]
    fn write_atomic_overwrites_completely() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_atomic(&path, b"first version, quite long content\n").unwrap();
        write_atomic(&path, b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn write_atomic_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.csv");

        write_atomic(&path, b"data\n").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn concurrent_readers_never_see_partial_writes() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.csv");
        let a = "a".repeat(64 * 1024) + "\n";
        let b = "b".repeat(64 * 1024) + "\n";
        write_atomic(&path, a.as_bytes()).unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let path = path.clone();
            let stop = Arc::clone(&stop);
            let (a, b) = (a.clone(), b.clone());
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let content = std::fs::read_to_string(&path).unwrap();
                    assert!(content == a || content == b, "observed a torn write");
                }
            })
        };

        for _ in 0..200 {
            write_atomic(&path, b.as_bytes()).unwrap();
            write_atomic(&path, a.as_bytes()).unwrap();
        }
        stop.store(true, Ordering::Relaxed);
        reader.join().unwrap();
    }

    #[test]
    fn meta_path_appends_suffix() {
        assert_eq!(
            meta_path(Path::new("ml/churn_features.csv")),
            PathBuf::from("ml/churn_features.csv.meta.json")
        );
    }

    #[test]
    fn write_and_reload_meta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let meta = RunMeta::now();

        write_meta(&path, &meta).unwrap();

        let bytes = std::fs::read(meta_path(&path)).unwrap();
        let loaded: RunMeta = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded.generation, meta.generation);
    }
}
