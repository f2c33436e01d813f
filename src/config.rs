// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets (the JWT signing key) must come from the environment; there is
//! no baked-in default outside of `test_default()`.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Path of the churn feature interchange file written by the export stage
    pub features_path: PathBuf,
    /// Path of the results file written by the external worker
    pub results_path: PathBuf,
    /// Interpreter used to run the worker script (e.g. `python3`)
    pub worker_program: String,
    /// Worker script invoked with the interchange and results paths as args
    pub worker_script: String,
    /// Upper bound on a single worker invocation, in seconds
    pub worker_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            features_path: env::var("CHURN_FEATURES_PATH")
                .unwrap_or_else(|_| "ml/churn_features.csv".to_string())
                .into(),
            results_path: env::var("CHURN_RESULTS_PATH")
                .unwrap_or_else(|_| "ml/churn_results.csv".to_string())
                .into(),
            worker_program: env::var("CHURN_WORKER_PROGRAM")
                .unwrap_or_else(|_| "python3".to_string()),
            worker_script: env::var("CHURN_WORKER_SCRIPT")
                .unwrap_or_else(|_| "ml/churn_predict.py".to_string()),
            worker_timeout_secs: env::var("CHURN_WORKER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        })
    }

    /// Config for tests only: lazy local database, throwaway key, temp paths.
    pub fn test_default() -> Self {
        let tmp = env::temp_dir();
        Self {
            database_url: "postgres://localhost/churnwatch_test".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            port: 5000,
            frontend_url: "http://localhost:5173".to_string(),
            features_path: tmp.join("churnwatch_test_features.csv"),
            results_path: tmp.join("churnwatch_test_results.csv"),
            worker_program: "true".to_string(),
            worker_script: String::new(),
            worker_timeout_secs: 5,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/churnwatch");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!!");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "postgres://localhost/churnwatch");
        assert_eq!(config.port, 5000);
        assert_eq!(config.worker_program, "python3");
        assert_eq!(config.worker_timeout_secs, 60);
    }

    #[test]
    fn test_default_paths() {
        let config = Config::test_default();
        assert!(config.features_path.ends_with("churnwatch_test_features.csv"));
        assert!(config.results_path.ends_with("churnwatch_test_results.csv"));
    }
}
