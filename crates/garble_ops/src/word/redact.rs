use smallvec::SmallVec;

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::affix_bounds;
use garble_core::{GarbleError, Result};

use crate::traits::GlitchOp;
use crate::weighting::{direct_length_weight, weighted_sample_without_replacement};

/// Default redaction glyph (U+2588 FULL BLOCK).
pub const DEFAULT_REDACTION_CHAR: char = '\u{2588}';

/// Replaces word cores with a repeated block glyph.
///
/// At least one word is always redacted. Selection is weighted towards long
/// words unless `unweighted` is set. With `merge_adjacent`, neighbouring
/// redactions collapse into one continuous bar.
///
/// # Errors
/// Returns `GarbleError::Precondition` when the buffer has no word with a
/// core, or when the rate asks for more words than exist.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, RedactWords};
///
/// let op = RedactWords { replacement_char: '█', rate: 1.0, merge_adjacent: true, unweighted: false };
/// let mut buffer = TextBuffer::new("top secret");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(42)).unwrap();
/// assert_eq!(buffer.to_string(), "█████████");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedactWords {
    /// Glyph repeated once per core character
    pub replacement_char: char,
    /// Fraction of candidate words to redact
    pub rate: f64,
    /// Merge adjacent redactions into one run
    pub merge_adjacent: bool,
    /// Select uniformly instead of favouring long words
    pub unweighted: bool,
}

impl Default for RedactWords {
    fn default() -> Self {
        Self {
            replacement_char: DEFAULT_REDACTION_CHAR,
            rate: 0.025,
            merge_adjacent: false,
            unweighted: false,
        }
    }
}

struct Candidate {
    index: usize,
    core_start: usize,
    core_end: usize,
    repeat: usize,
    weight: f64,
}

impl GlitchOp for RedactWords {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let candidates: Vec<Candidate> = buffer
            .words()
            .enumerate()
            .filter_map(|(index, word)| {
                let (core_start, core_end) = affix_bounds(word);
                let core = &word[core_start..core_end];
                if core.is_empty() {
                    return None;
                }
                let weight = if self.unweighted {
                    1.0
                } else {
                    direct_length_weight(core, word)
                };
                Some(Candidate {
                    index,
                    core_start,
                    core_end,
                    repeat: core.chars().count(),
                    weight,
                })
            })
            .collect();
        if candidates.is_empty() {
            return Err(GarbleError::precondition("no redactable words"));
        }

        let rate = self.rate.max(0.0);
        let requested = ((candidates.len() as f64 * rate).floor() as usize).max(1);
        if requested > candidates.len() {
            return Err(GarbleError::precondition(format!(
                "cannot redact {requested} words; only {} are redactable",
                candidates.len()
            )));
        }

        let weighted: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(slot, candidate)| (slot, candidate.weight))
            .collect();
        let mut selections = weighted_sample_without_replacement(rng, &weighted, requested)?;
        selections.sort_unstable_by_key(|&slot| candidates[slot].index);

        let mut replacements: SmallVec<[(usize, String); 16]> = SmallVec::new();
        for slot in selections {
            let candidate = &candidates[slot];
            let word = buffer.word(candidate.index)?;
            let mut redacted = String::with_capacity(word.len() + candidate.repeat * 3);
            redacted.push_str(&word[..candidate.core_start]);
            redacted.extend(std::iter::repeat(self.replacement_char).take(candidate.repeat));
            redacted.push_str(&word[candidate.core_end..]);
            replacements.push((candidate.index, redacted));
        }
        tracing::trace!(redacted = replacements.len(), "redact");

        buffer.replace_words_bulk(replacements)?;
        if self.merge_adjacent {
            buffer.merge_repeated_char_words(self.replacement_char);
        }
        Ok(())
    }
}
