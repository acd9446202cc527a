//! Word-choice operations.
//!
//! - [`Homophones`]: sound-alike substitutions from a built-in group list
//! - [`Jargoyle`]: caller-supplied dictionary substitutions
//! - [`Pedant`]: deterministic grammar hypercorrections, one per [`Stone`]
//! - [`Hokey`]: expressive letter stretching

mod hokey;
mod homophones;
mod jargoyle;
mod pedant;

pub use hokey::Hokey;
pub use homophones::{HomophoneWeighting, Homophones};
pub use jargoyle::{DriftMode, Jargoyle};
pub use pedant::{Pedant, Stone};
