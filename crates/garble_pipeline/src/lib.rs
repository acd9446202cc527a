//! # garble_pipeline: Composition Layer of the garble Engine
//!
//! ## Layer 3 (Composition) Role
//!
//! garble_pipeline turns serialisable descriptors into deterministic runs:
//! - Sequential execution with per-operation seed derivation (`pipeline`)
//! - Tagged, serde-decodable operation descriptors (`descriptor`)
//! - Host entry points `compose`, `try_compose`, `plan`, `compose_batch` (`adapter`)
//! - TOML/JSON run files with environment seed override (`config`)
//! - Error types: `PipelineError`, `BoundaryError` (`error`)
//!
//! ## Architecture
//!
//! ```text
//! descriptors + master seed
//!          ↓
//!   adapter::compose ── Descriptor::build ──→ Operation (closed enum)
//!          ↓
//!   Pipeline::run ── derive_seed(master, name, index) ──→ Mt19937
//!          ↓
//!   GlitchOp::apply on one TextBuffer, in order
//!          ↓
//!     final text
//! ```
//!
//! ## Usage Examples
//!
//! ```rust
//! use garble_pipeline::{compose, RunConfig};
//!
//! let config = RunConfig::from_toml_str(r#"
//! master_seed = 151
//!
//! [[operations]]
//! name = "Rushmore"
//! type = "swap_adjacent"
//! rate = 1.0
//! "#).unwrap();
//!
//! let seed = config.master_seed.unwrap_or_default();
//! let out = compose("one two three four", &config.operations, seed).unwrap();
//! assert_eq!(out, "two one four three");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod adapter;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod pipeline;

pub use adapter::{build_pipeline, compose, compose_batch, plan, try_compose, Composition, PlanInput};
pub use config::{ConfigError, RunConfig, MASTER_SEED_ENV};
pub use descriptor::{Descriptor, DescriptorError, OperationSpec, SUPPORTED_KINDS};
pub use error::{BoundaryError, BoundaryResult, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineEntry};
