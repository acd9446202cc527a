use smallvec::SmallVec;

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::split_affixes;
use garble_core::Result;

use crate::traits::GlitchOp;

/// Swaps the cores of adjacent word pairs.
///
/// Words are paired `(0, 1)`, `(2, 3)`, … and a pair is skipped when either
/// core is empty. Punctuation and separators stay where they are.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, SwapAdjacentWords};
///
/// let op = SwapAdjacentWords { rate: 1.0 };
/// let mut buffer = TextBuffer::new("one two three four");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
/// assert_eq!(buffer.to_string(), "two one four three");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapAdjacentWords {
    /// Probability of swapping each eligible pair
    pub rate: f64,
}

impl GlitchOp for SwapAdjacentWords {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let total = buffer.word_count();
        if total < 2 {
            return Ok(());
        }
        let rate = self.rate.clamp(0.0, 1.0);
        if rate <= 0.0 {
            return Ok(());
        }

        let mut replacements: SmallVec<[(usize, String); 8]> = SmallVec::new();
        let mut index = 0usize;
        while index + 1 < total {
            let (left_prefix, left_core, left_suffix) = split_affixes(buffer.word(index)?);
            let (right_prefix, right_core, right_suffix) = split_affixes(buffer.word(index + 1)?);
            if !left_core.is_empty() && !right_core.is_empty() && (rate >= 1.0 || rng.random() < rate) {
                replacements.push((index, format!("{left_prefix}{right_core}{left_suffix}")));
                replacements.push((index + 1, format!("{right_prefix}{left_core}{right_suffix}")));
            }
            index += 2;
        }

        if replacements.is_empty() {
            return Ok(());
        }
        buffer.replace_words_bulk(replacements)
    }
}
