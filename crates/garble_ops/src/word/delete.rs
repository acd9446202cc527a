use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::split_affixes;
use garble_core::Result;

use crate::traits::GlitchOp;
use crate::weighting::{inverse_length_weight, mean_weight, selection_probability};

/// Deletes words while keeping their punctuation.
///
/// The first word is never a candidate. At most `floor(candidates × rate)`
/// words are removed; each keeps its trimmed prefix and suffix, and spacing
/// is normalised afterwards.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{DeleteRandomWords, GlitchOp};
///
/// let op = DeleteRandomWords { rate: 1.0, unweighted: false };
/// let mut buffer = TextBuffer::new("a b c d");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
/// assert_eq!(buffer.to_string(), "a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeleteRandomWords {
    /// Target fraction of words to delete
    pub rate: f64,
    /// Select uniformly instead of favouring short words
    pub unweighted: bool,
}

impl GlitchOp for DeleteRandomWords {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        if buffer.word_count() <= 1 {
            return Ok(());
        }

        let candidates: Vec<(usize, f64)> = buffer
            .words()
            .enumerate()
            .skip(1)
            .filter(|(_, word)| !word.trim().is_empty())
            .map(|(index, word)| {
                let weight = if self.unweighted {
                    1.0
                } else {
                    inverse_length_weight(split_affixes(word).1, word)
                };
                (index, weight)
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let rate = self.rate.clamp(0.0, 1.0);
        if rate <= 0.0 {
            return Ok(());
        }
        let allowed = (candidates.len() as f64 * rate).floor() as usize;
        if allowed == 0 {
            return Ok(());
        }
        let mean = mean_weight(candidates.iter().map(|(_, weight)| *weight));

        let mut doomed = Vec::with_capacity(allowed);
        for &(index, weight) in &candidates {
            if doomed.len() >= allowed {
                break;
            }
            if rng.random() >= selection_probability(rate, weight, mean) {
                continue;
            }
            doomed.push(index);
        }
        if doomed.is_empty() {
            return Ok(());
        }
        tracing::trace!(deleted = doomed.len(), allowed, "delete");

        let mut remnants = Vec::new();
        let mut removals = Vec::new();
        for &index in &doomed {
            let word = buffer.word(index)?;
            let (prefix, _, suffix) = split_affixes(word);
            let remnant = format!("{}{}", prefix.trim(), suffix.trim());
            if remnant.is_empty() {
                removals.push(index);
            } else {
                remnants.push((index, remnant));
            }
        }

        buffer.replace_words_bulk(remnants)?;
        for &index in removals.iter().rev() {
            buffer.delete_word(index)?;
        }
        buffer.normalize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    fn run(text: &str, rate: f64, seed: i128) -> String {
        let op = DeleteRandomWords {
            rate,
            unweighted: false,
        };
        let mut buffer = TextBuffer::new(text);
        op.apply(&mut buffer, &mut Mt19937::from_seed_int(seed)).unwrap();
        buffer.to_string()
    }

    #[test]
    fn test_single_word_is_protected() {
        assert_eq!(run("solo", 1.0, 3), "solo");
    }

    #[test]
    fn test_punctuation_survives_deletion() {
        assert_eq!(run("Well, this (is) fine.", 1.0, 3), "Well, ().");
    }

    #[test]
    fn test_rate_zero_is_identity() {
        assert_eq!(run("keep  every word", 0.0, 3), "keep  every word");
    }

    #[test]
    fn test_never_exceeds_allowance() {
        let text = "one two three four five six seven eight nine ten";
        for seed in 0..20 {
            let out = run(text, 0.3, seed);
            let remaining = out.split_whitespace().count();
            assert!(remaining >= 10 - 2, "seed {seed}: {out}");
        }
    }
}
