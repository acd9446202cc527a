//! Word-level operations.
//!
//! These operations address the buffer by word index and edit word cores
//! while carrying punctuation affixes through unchanged:
//!
//! - [`ReduplicateWords`]: Stutters words (`word` → `word word`)
//! - [`DeleteRandomWords`]: Drops words, keeping their punctuation
//! - [`SwapAdjacentWords`]: Exchanges the cores of neighbouring word pairs
//! - [`RedactWords`]: Replaces cores with a repeated block glyph
//! - [`RushmoreCombo`]: Runs delete, duplicate and swap in a configured order
//!
//! Word selection for delete and duplicate is rate-controlled and, unless
//! `unweighted` is set, biased towards short words.

mod delete;
mod redact;
mod reduplicate;
mod rushmore;
mod swap;

pub use delete::DeleteRandomWords;
pub use redact::RedactWords;
pub use reduplicate::ReduplicateWords;
pub use rushmore::{RushmoreCombo, RushmoreMode};
pub use swap::SwapAdjacentWords;
