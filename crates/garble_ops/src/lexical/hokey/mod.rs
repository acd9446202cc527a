//! Expressive lengthening (`so` → `soooo`, `yes` → `yesss`).
//!
//! Words are scored for how naturally they stretch, a rate-driven subset is
//! chosen clause by clause, and each chosen word has one site (a vowel run,
//! a silent-`e` vowel, or a final sibilant or sonorant) repeated a sampled
//! number of times.

mod lexicon;
mod locator;
mod sampler;
mod stretchability;

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use crate::traits::GlitchOp;

use locator::{apply_stretch, find_stretch_site};
use sampler::NegativeBinomialSampler;

/// Stretches emphatic words by repeating letters.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, Hokey};
///
/// let mut buffer = TextBuffer::new("so cool");
/// let op = Hokey { rate: 1.0, extension_min: 2, extension_max: 2, ..Hokey::default() };
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(5)).unwrap();
/// assert_eq!(buffer.to_string(), "sooo cooooool");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hokey {
    /// Share of candidate words stretched
    pub rate: f64,
    /// Fewest extra copies per stretch
    pub extension_min: usize,
    /// Most extra copies per stretch
    pub extension_max: usize,
    /// Words with more letters than this are damped; beyond twice this they
    /// are skipped. Zero disables the limit.
    pub word_length_threshold: usize,
    /// Success probability of the repeat sampler at zero intensity
    pub base_p: f64,
}

impl Default for Hokey {
    fn default() -> Self {
        Self {
            rate: 0.3,
            extension_min: 2,
            extension_max: 5,
            word_length_threshold: 6,
            base_p: 0.45,
        }
    }
}

impl GlitchOp for Hokey {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        if buffer.is_empty() || self.rate.is_nan() {
            return Ok(());
        }
        let rate = self.rate.clamp(0.0, 1.0);
        let text = buffer.to_string();

        let mut tokens = stretchability::tokenise(&text)?;
        let candidates = stretchability::analyse(&tokens)?;
        let selected = stretchability::select(&candidates, rate, rng);
        let sampler = NegativeBinomialSampler { base_p: self.base_p };
        let threshold = self.word_length_threshold;

        let mut stretched = 0usize;
        for candidate in &selected {
            let original = tokens[candidate.token].text.as_str();
            let Some(site) = find_stretch_site(original) else {
                continue;
            };
            let mut intensity = (candidate.features.intensity() + 0.35 * candidate.score).min(1.5);
            let letters = original.chars().filter(|c| c.is_alphabetic()).count();
            if threshold > 0 && letters > threshold * 2 {
                continue;
            }
            if threshold > 0 && letters > threshold {
                let excess = letters - threshold;
                intensity /= 1.0 + 0.35 * excess as f64;
                if candidate.score < 0.35 && excess >= 2 {
                    continue;
                }
            }
            let intensity = intensity.max(0.05);
            let repeats = sampler.sample(rng, intensity, self.extension_min, self.extension_max);
            if repeats == 0 {
                continue;
            }
            tokens[candidate.token].text = apply_stretch(original, site, repeats);
            stretched += 1;
        }

        tracing::trace!(candidates = candidates.len(), stretched, "hokey");
        if stretched == 0 {
            return Ok(());
        }
        let rebuilt: String = tokens.iter().map(|token| token.text.as_str()).collect();
        buffer.replace_char_range(0..text.len(), &rebuilt)
    }
}
