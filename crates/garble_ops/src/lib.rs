//! # garble_ops: Mutation Operations for the garble Engine
//!
//! ## Layer 2 (Operations) Role
//!
//! garble_ops implements every text mutation on top of the Layer 1 buffer and
//! random source:
//! - The uniform operation contract (`traits::GlitchOp`)
//! - Word-level operations: delete, reduplicate, swap, redact, combo (`word`)
//! - Character-level operations: typos, homoglyphs, OCR confusions,
//!   zero-width injection, quote pairing (`glyph`)
//! - Word-choice operations: homophones, dictionary drift, hypercorrections,
//!   expressive lengthening (`lexical`)
//! - Closed dispatch over all kinds (`operation::Operation`)
//!
//! Every operation draws exclusively from the `&mut dyn RandomSource` it is
//! handed, so a given seed and input always yield the same output.
//!
//! ## Usage Examples
//!
//! ```rust
//! use garble_core::buffer::TextBuffer;
//! use garble_core::rng::Mt19937;
//! use garble_ops::{DeleteRandomWords, GlitchOp, Operation, SwapAdjacentWords};
//!
//! let ops: Vec<Operation> = vec![
//!     SwapAdjacentWords { rate: 1.0 }.into(),
//!     DeleteRandomWords { rate: 0.0, unweighted: false }.into(),
//! ];
//! let mut buffer = TextBuffer::new("one two three four");
//! for op in &ops {
//!     op.apply(&mut buffer, &mut Mt19937::from_seed_int(7)).unwrap();
//! }
//! assert_eq!(buffer.to_string(), "two one four three");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialisation for parameter enums (modes, placements,
//!   weightings, stones)

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod glyph;
pub mod lexical;
pub mod operation;
pub mod traits;
pub mod weighting;
pub mod word;

pub use glyph::{
    ClassSelection, Homoglyph, KeyNeighbourMap, MotorWeighting, OcrArtifacts, Placement, QuotePairs,
    Script, ShiftMap, ShiftSlip, Typo, Visibility, ZeroWidth,
};
pub use lexical::{DriftMode, Hokey, HomophoneWeighting, Homophones, Jargoyle, Pedant, Stone};
pub use operation::Operation;
pub use traits::GlitchOp;
pub use word::{
    DeleteRandomWords, RedactWords, ReduplicateWords, RushmoreCombo, RushmoreMode,
    SwapAdjacentWords,
};
