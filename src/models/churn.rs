// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Churn pipeline models: feature rows, worker result rows, run metadata.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// One aggregated feature row per user, regenerated in full on every
/// pipeline run. `support_tickets`, `tenure_months` and `churn` are
/// placeholder columns the model expects; the database fills them with
/// constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChurnFeatureRow {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub num_videos_watched: i64,
    pub avg_watch_time_per_day: f64,
    pub last_login_days_ago: i64,
    pub support_tickets: i64,
    pub tenure_months: i64,
    pub churn: i64,
}

impl ChurnFeatureRow {
    /// Column names, in interchange-file order.
    pub const COLUMNS: [&'static str; 9] = [
        "user_id",
        "full_name",
        "email",
        "num_videos_watched",
        "avg_watch_time_per_day",
        "last_login_days_ago",
        "support_tickets",
        "tenure_months",
        "churn",
    ];
}

/// One row of the worker's results file. The worker owns the column set
/// (it appends its prediction column), so fields are kept positionally
/// under the header names rather than as a fixed struct.
#[derive(Debug, Clone, PartialEq)]
pub struct ChurnResultRow {
    pub fields: Vec<(String, String)>,
}

impl ChurnResultRow {
    /// Look up a field value by header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// Serialize as a JSON object preserving the file's column order.
impl Serialize for ChurnResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Sidecar metadata written next to the interchange and results files so
/// the reader can tell whether results correspond to the latest export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Monotonically increasing run marker (millisecond timestamp).
    pub generation: u64,
    pub exported_at: DateTime<Utc>,
}

impl RunMeta {
    pub fn now() -> Self {
        let exported_at = Utc::now();
        Self {
            generation: exported_at.timestamp_millis() as u64,
            exported_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_row_serializes_in_field_order() {
        let row = ChurnResultRow {
            fields: vec![
                ("user_id".to_string(), "7".to_string()),
                ("churn_probability".to_string(), "0.42".to_string()),
                ("email".to_string(), "a@b.c".to_string()),
            ],
        };

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"user_id":"7","churn_probability":"0.42","email":"a@b.c"}"#
        );
    }

    #[test]
    fn result_row_get_by_name() {
        let row = ChurnResultRow {
            fields: vec![("churn".to_string(), "1".to_string())],
        };
        assert_eq!(row.get("churn"), Some("1"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn run_meta_generation_matches_timestamp() {
        let meta = RunMeta::now();
        assert_eq!(meta.generation, meta.exported_at.timestamp_millis() as u64);
    }
}
