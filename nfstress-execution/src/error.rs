//! Error types for external command execution

use std::time::Duration;
use thiserror::Error;

/// Errors raised while running an external command
///
/// These never fail a run: executors fold them into a job status.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to run {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {0:?}")]
    TimeoutError(Duration),
}

impl ExecutionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::TimeoutError(_))
    }
}
