//! Shared types for the engine.
//!
//! This module provides:
//! - `error`: Structured error types for buffer edits, operation preconditions, and RNG draws
//!
//! # Re-exports
//!
//! For convenience, the error types are re-exported at this module level:
//! [`GarbleError`], [`IndexTarget`], [`RngError`] and the [`Result`] alias.

pub mod error;

pub use error::{GarbleError, IndexTarget, Result, RngError};
