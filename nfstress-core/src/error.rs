//! Core error types for nfstress

use thiserror::Error;

use crate::types::ParseError;

/// Core error type shared by the domain layer
#[derive(Debug, Error)]
pub enum CoreError {
    /// Identifier range bounds or width are inconsistent
    #[error("Invalid identifier range: {0}")]
    InvalidRange(String),

    /// A candidate set resolved to nothing
    #[error("No {0} candidates available")]
    NoCandidates(String),

    /// The liveness probe itself could not run
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Value parsing errors
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CoreError {
    /// Whether this error means no job can run at all
    pub fn is_no_candidates(&self) -> bool {
        matches!(self, CoreError::NoCandidates(_))
    }
}

/// Result type alias for nfstress-core
pub type Result<T> = std::result::Result<T, CoreError>;
