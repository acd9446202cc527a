use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::split_affixes;
use garble_core::Result;

use crate::traits::GlitchOp;
use crate::weighting::{inverse_length_weight, mean_weight, selection_probability};

/// Repeats words to simulate stuttered speech.
///
/// A selected word `prefix + core + suffix` becomes `prefix + core`, a
/// space, then `core + suffix`, so `"Hello,"` turns into `"Hello Hello,"`.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, ReduplicateWords};
///
/// let op = ReduplicateWords { rate: 1.0, unweighted: false };
/// let mut buffer = TextBuffer::new("Hello world");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(1)).unwrap();
/// assert_eq!(buffer.to_string(), "Hello Hello world world");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduplicateWords {
    /// Target fraction of words to duplicate
    pub rate: f64,
    /// Select uniformly instead of favouring short words
    pub unweighted: bool,
}

struct Candidate<'a> {
    index: usize,
    prefix: &'a str,
    core: &'a str,
    suffix: &'a str,
    weight: f64,
}

impl GlitchOp for ReduplicateWords {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let candidates: Vec<Candidate<'_>> = buffer
            .words()
            .enumerate()
            .filter(|(_, word)| !word.trim().is_empty())
            .map(|(index, word)| {
                let (prefix, core, suffix) = split_affixes(word);
                let weight = if self.unweighted {
                    1.0
                } else {
                    inverse_length_weight(core, word)
                };
                Candidate {
                    index,
                    prefix,
                    core,
                    suffix,
                    weight,
                }
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let rate = self.rate.clamp(0.0, 1.0);
        if rate <= 0.0 {
            return Ok(());
        }
        let mean = mean_weight(candidates.iter().map(|candidate| candidate.weight));

        let mut firsts = Vec::new();
        let mut seconds = Vec::new();
        for candidate in &candidates {
            if rng.random() >= selection_probability(rate, candidate.weight, mean) {
                continue;
            }
            firsts.push((candidate.index, format!("{}{}", candidate.prefix, candidate.core)));
            seconds.push((candidate.index, format!("{}{}", candidate.core, candidate.suffix)));
        }

        tracing::trace!(duplicated = firsts.len(), "reduplicate");
        buffer.replace_words_bulk(firsts)?;
        buffer.insert_words_after_bulk(seconds)
    }
}
