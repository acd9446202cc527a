//! Character-level operations.
//!
//! These operations edit characters inside segments rather than whole words:
//! keyboard typos, look-alike glyph swaps, recogniser confusions, invisible
//! character injection and typographic quote pairing.
//!
//! Typos may split or join words, so [`Typo`] re-tokenises the buffer once at
//! the end. Every other operation here keeps the segment structure intact and
//! writes back through `replace_segments_bulk`.

pub mod keyboard;

mod homoglyph;
mod ocr;
mod quotes;
mod typo;
mod zero_width;

pub use homoglyph::{ClassSelection, Homoglyph, Script};
pub use keyboard::{MotorWeighting, ShiftMap, KeyNeighbourMap};
pub use ocr::OcrArtifacts;
pub use quotes::QuotePairs;
pub use typo::{ShiftSlip, Typo};
pub use zero_width::{Placement, Visibility, ZeroWidth};
