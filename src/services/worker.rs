// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed boundary around the external churn model process.
//!
//! The worker is opaque: given the interchange file path and the results
//! file path as its two arguments, it must write the results file and
//! exit 0. Anything else (non-zero exit, spawn failure, timeout) means no
//! trustworthy results were produced.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Cap on captured stderr carried in error diagnostics.
const MAX_DIAGNOSTIC_CHARS: usize = 2000;

/// Errors from a worker invocation.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Worker exited with status {code:?}: {stderr}")]
    Failed {
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs the external predictive script with a bounded wall-clock budget.
#[derive(Clone)]
pub struct ScriptWorker {
    program: String,
    script: String,
    timeout: Duration,
}

impl ScriptWorker {
    pub fn new(program: &str, script: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            script: script.to_string(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke the worker on `input`, expecting it to (re)write `output`
    /// before exiting 0.
    pub async fn invoke(&self, input: &Path, output: &Path) -> Result<(), WorkerError> {
        tracing::debug!(
            program = %self.program,
            script = %self.script,
            input = %input.display(),
            "Invoking churn worker"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.script)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| WorkerError::TimedOut(self.timeout))?;
        let out = result?;

        if !out.status.success() {
            return Err(WorkerError::Failed {
                code: out.status.code(),
                stderr: diagnostic(&out.stderr),
            });
        }

        let stdout = diagnostic(&out.stdout);
        if !stdout.is_empty() {
            tracing::debug!(output = %stdout, "Churn worker stdout");
        }
        Ok(())
    }
}

/// Trimmed, length-capped lossy text from a captured output stream.
fn diagnostic(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim().chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}
