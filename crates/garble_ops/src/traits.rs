//! The uniform operation contract.
//!
//! Every mutation implements [`GlitchOp`]: it receives the buffer and a
//! freshly seeded random source, mutates the buffer in place, and either
//! succeeds or returns an error without retrying. Side effects are confined
//! to the buffer and the draws consumed from the source.
//!
//! # Examples
//!
//! ```
//! use garble_core::buffer::TextBuffer;
//! use garble_core::rng::{Mt19937, RandomSource};
//! use garble_core::Result;
//! use garble_ops::GlitchOp;
//!
//! struct Shout;
//!
//! impl GlitchOp for Shout {
//!     fn apply(&self, buffer: &mut TextBuffer, _rng: &mut dyn RandomSource) -> Result<()> {
//!         let upper = buffer.to_string().to_uppercase();
//!         buffer.replace_char_range(0..buffer.byte_len(), &upper)
//!     }
//! }
//!
//! let mut buffer = TextBuffer::new("quiet please");
//! Shout.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
//! assert_eq!(buffer.to_string(), "QUIET PLEASE");
//! ```

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

/// A single-shot mutation applied to a text buffer.
pub trait GlitchOp {
    /// Mutates `buffer` using draws from `rng`.
    ///
    /// # Errors
    /// Any `GarbleError` aborts the operation. Implementations validate
    /// before writing, so an error never leaves a partial edit behind.
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()>;
}
