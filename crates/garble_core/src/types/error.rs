//! Error types for structured error handling.
//!
//! This module provides:
//! - `GarbleError`: Errors raised while mutating a buffer or applying an operation
//! - `RngError`: Errors raised by invalid draw requests against a random source
//! - `IndexTarget`: Which address space an out-of-range index referred to
//!
//! Every error aborts the operation that raised it. There is no partial
//! application: a failed bulk edit leaves the buffer untouched.

use std::fmt;
use thiserror::Error;

/// Address space of an index reported by [`GarbleError::BufferIndex`].
///
/// # Examples
/// ```
/// use garble_core::IndexTarget;
///
/// assert_eq!(format!("{}", IndexTarget::Word), "word");
/// assert_eq!(format!("{}", IndexTarget::Byte), "byte");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexTarget {
    /// Index into the word-only view of the buffer
    Word,
    /// Index into the full segment vector (words and separators)
    Segment,
    /// Byte offset into the buffer text
    Byte,
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::Word => write!(f, "word"),
            IndexTarget::Segment => write!(f, "segment"),
            IndexTarget::Byte => write!(f, "byte"),
        }
    }
}

/// Invalid draw requests against a random source.
///
/// The variants mirror the conditions under which CPython's `random`
/// module raises `ValueError`, so that a host-side generator and the
/// native generator reject exactly the same requests.
///
/// # Examples
/// ```
/// use garble_core::RngError;
///
/// let err = RngError::SampleTooLarge { requested: 5, population: 3 };
/// assert_eq!(
///     format!("{}", err),
///     "sample of 5 is larger than the population of 3"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RngError {
    /// `range` was asked for a value in an empty interval.
    #[error("empty range [{start}, {stop})")]
    EmptyRange {
        /// Inclusive lower bound requested
        start: i64,
        /// Exclusive upper bound requested
        stop: i64,
    },

    /// `range_step` was called with a step of zero.
    #[error("zero step for range")]
    ZeroStep,

    /// `sample` asked for more items than the population holds.
    #[error("sample of {requested} is larger than the population of {population}")]
    SampleTooLarge {
        /// Number of items requested
        requested: usize,
        /// Number of items available
        population: usize,
    },

    /// `bits` was asked for more bits than fit the return type.
    #[error("cannot draw {bits} bits; at most 128 are supported")]
    BitsTooWide {
        /// Number of bits requested
        bits: u32,
    },

    /// A restored generator state has the wrong shape.
    #[error("invalid generator state: {words} words with index {index}")]
    InvalidState {
        /// Number of state words supplied
        words: usize,
        /// Position supplied
        index: usize,
    },
}

/// Engine errors raised by buffer primitives and operations.
///
/// # Variants
/// - `BufferIndex`: Word, segment or byte index out of bounds
/// - `TokenBoundary`: Byte offset splits a UTF-8 character
/// - `Precondition`: Operation cannot run on this input (e.g. nothing to redact)
/// - `Rng`: A draw request was rejected by the random source
///
/// # Examples
/// ```
/// use garble_core::{GarbleError, IndexTarget};
///
/// let err = GarbleError::BufferIndex { target: IndexTarget::Word, index: 7, len: 3 };
/// assert_eq!(format!("{}", err), "word index 7 out of range (len 3)");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GarbleError {
    /// Index or range endpoint outside the buffer.
    #[error("{target} index {index} out of range (len {len})")]
    BufferIndex {
        /// Address space of the index
        target: IndexTarget,
        /// Offending index
        index: usize,
        /// Length of the address space at the time of the call
        len: usize,
    },

    /// Byte offset does not fall on a character boundary.
    #[error("byte offset {offset} is not on a character boundary")]
    TokenBoundary {
        /// Offending byte offset
        offset: usize,
    },

    /// The operation's input does not satisfy its preconditions.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The random source rejected a draw request.
    #[error("rng error: {0}")]
    Rng(#[from] RngError),
}

impl GarbleError {
    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a word index error
    pub fn word_index(index: usize, len: usize) -> Self {
        Self::BufferIndex {
            target: IndexTarget::Word,
            index,
            len,
        }
    }

    /// Create a segment index error
    pub fn segment_index(index: usize, len: usize) -> Self {
        Self::BufferIndex {
            target: IndexTarget::Segment,
            index,
            len,
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, GarbleError>;
