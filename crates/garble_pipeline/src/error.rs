//! Pipeline and boundary error types.
//!
//! Operation failures are wrapped with the failing entry's name and
//! position so a caller can report which configured operation failed
//! without re-deriving seeds or re-running the pipeline.

use garble_core::GarbleError;
use thiserror::Error;

/// A failure while running a [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An operation returned an error; nothing after it ran.
    #[error("operation '{name}' at position {index} failed: {source}")]
    Operation {
        /// Entry name used for seed derivation
        name: String,
        /// Position in the pipeline
        index: usize,
        /// The operation's own error
        #[source]
        source: GarbleError,
    },
}

/// A failure surfaced by the boundary adapter.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// A descriptor could not be decoded or failed validation.
    #[error("descriptor {index}: {message}")]
    Descriptor {
        /// Position in the descriptor list
        index: usize,
        /// What was wrong with it
        message: String,
    },

    /// The composed pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl BoundaryError {
    /// The position of the descriptor or operation at fault.
    pub fn index(&self) -> usize {
        match self {
            Self::Descriptor { index, .. } => *index,
            Self::Pipeline(PipelineError::Operation { index, .. }) => *index,
        }
    }
}

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for boundary adapter calls.
pub type BoundaryResult<T> = Result<T, BoundaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_display() {
        let err = PipelineError::Operation {
            name: "Redactyl".to_string(),
            index: 2,
            source: GarbleError::precondition("no redactable words"),
        };
        let message = err.to_string();
        assert!(message.starts_with("operation 'Redactyl' at position 2 failed"));
        assert!(message.contains("no redactable words"));
    }

    #[test]
    fn test_boundary_index() {
        let err = BoundaryError::Descriptor {
            index: 4,
            message: "bad".to_string(),
        };
        assert_eq!(err.index(), 4);
        assert_eq!(err.to_string(), "descriptor 4: bad");
    }
}
