//! CLI error type.

use garble_pipeline::{BoundaryError, ConfigError};
use thiserror::Error;

/// Errors surfaced by the `garble` binary
#[derive(Debug, Error)]
pub enum CliError {
    /// The run file could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Decoding or running the pipeline failed.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Plan output could not be encoded.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
