//! # garble_core: Foundation for the garble Text-Mutation Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! garble_core is the bottom layer of the workspace, providing:
//! - The tokenised text buffer (`buffer`)
//! - A Mersenne Twister reproducing CPython's `random.Random` draw for draw (`rng`)
//! - Per-operation seed derivation from a master seed (`seed`)
//! - Word affix and casing helpers shared by operations (`text`)
//! - Error types: `GarbleError`, `RngError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other garble_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - rand: `RngCore` integration for the Mersenne Twister
//! - blake2: The fixed-output hash behind seed derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use garble_core::buffer::TextBuffer;
//! use garble_core::rng::{Mt19937, RandomSource};
//! use garble_core::seed::derive_seed;
//!
//! let mut buffer = TextBuffer::new("Hello, brave new world");
//! assert_eq!(buffer.word_count(), 4);
//!
//! buffer.replace_word(1, "bold").unwrap();
//! assert_eq!(buffer.to_string(), "Hello, bold new world");
//!
//! let seed = derive_seed(151, "Typogre", 0);
//! let mut rng = Mt19937::from_seed_u64(seed);
//! let u = rng.random();
//! assert!((0.0..1.0).contains(&u));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for segment kinds and spans

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod buffer;
pub mod rng;
pub mod seed;
pub mod text;
pub mod types;

pub use types::error::{GarbleError, IndexTarget, Result, RngError};
