//! Error types for oracle-internal failures.
//!
//! These are never verdicts about a candidate. A candidate that fails to
//! compile or run is an [`crate::Evaluation`] value; an `OracleError` means
//! the oracle itself could not do its job.

use std::path::PathBuf;

/// Errors produced by the oracle machinery.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("failed to create scratch directory {path}: {source}")]
    ScratchCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove scratch directory {path}: {source}")]
    ScratchRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command line must not be empty")]
    EmptyCommand,

    #[error("invalid oracle configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for oracle operations.
pub type OracleResult<T> = std::result::Result<T, OracleError>;
