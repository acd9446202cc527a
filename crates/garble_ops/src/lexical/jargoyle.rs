use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::{split_affixes, transfer_casing};
use garble_core::Result;

use crate::traits::GlitchOp;

/// How a lexeme's alternative is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DriftMode {
    /// Always the first alternative in sorted order
    Literal,
    /// A uniformly random alternative
    #[default]
    Drift,
}

/// Dictionary-driven word substitution.
///
/// `lexemes` maps a lower-case word to its alternatives and is supplied by
/// the caller. `trunc(candidates × rate)` candidate words are chosen with
/// `sample` and replaced, keeping affixes and casing.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{DriftMode, GlitchOp, Jargoyle};
///
/// let lexemes = BTreeMap::from([("big".to_string(), vec!["large".to_string(), "huge".to_string()])]);
/// let op = Jargoyle { lexemes, mode: DriftMode::Literal, rate: 1.0 };
/// let mut buffer = TextBuffer::new("A Big deal");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
/// assert_eq!(buffer.to_string(), "A Huge deal");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Jargoyle {
    /// Lower-case word → alternatives
    pub lexemes: BTreeMap<String, Vec<String>>,
    /// Alternative selection
    pub mode: DriftMode,
    /// Fraction of candidate words replaced
    pub rate: f64,
}

impl Jargoyle {
    fn alternatives(&self, lowered: &str) -> Vec<&str> {
        let mut options: Vec<&str> = self
            .lexemes
            .get(lowered)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|option| !option.is_empty() && !option.eq_ignore_ascii_case(lowered))
            .collect();
        options.sort_unstable();
        options.dedup();
        options
    }
}

impl GlitchOp for Jargoyle {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let rate = if self.rate.is_nan() { 0.0 } else { self.rate.clamp(0.0, 1.0) };
        if rate <= 0.0 || self.lexemes.is_empty() {
            return Ok(());
        }

        let candidates: Vec<(usize, Vec<&str>)> = buffer
            .words()
            .enumerate()
            .filter_map(|(index, word)| {
                let core = split_affixes(word).1;
                let options = self.alternatives(&core.to_lowercase());
                (!options.is_empty()).then_some((index, options))
            })
            .collect();
        let k = (candidates.len() as f64 * rate).trunc() as usize;
        if k == 0 {
            return Ok(());
        }

        let mut picked = rng.sample(candidates.len(), k)?;
        picked.sort_unstable();

        let mut replacements = Vec::with_capacity(k);
        for slot in picked {
            let (index, options) = &candidates[slot];
            let choice = match self.mode {
                DriftMode::Literal => options[0],
                DriftMode::Drift => options[rng.range(options.len())?],
            };
            let (prefix, core, suffix) = split_affixes(buffer.word(*index)?);
            replacements.push((*index, format!("{prefix}{}{suffix}", transfer_casing(core, choice))));
        }
        tracing::trace!(candidates = candidates.len(), replaced = k, "jargoyle");
        buffer.replace_words_bulk(replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    fn lexemes() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            ("red".to_string(), vec!["crimson".to_string(), "scarlet".to_string()]),
            ("blue".to_string(), vec!["azure".to_string(), "blue".to_string()]),
            ("green".to_string(), vec![]),
        ])
    }

    #[test]
    fn test_literal_mode_is_stable_across_seeds() {
        let op = Jargoyle {
            lexemes: lexemes(),
            mode: DriftMode::Literal,
            rate: 1.0,
        };
        for seed in 0..5 {
            let mut buffer = TextBuffer::new("RED, blue and green.");
            op.apply(&mut buffer, &mut Mt19937::from_seed_int(seed)).unwrap();
            assert_eq!(buffer.to_string(), "CRIMSON, azure and green.");
        }
    }

    #[test]
    fn test_drift_mode_picks_listed_alternative() {
        let op = Jargoyle {
            lexemes: lexemes(),
            mode: DriftMode::Drift,
            rate: 1.0,
        };
        for seed in 0..10 {
            let mut buffer = TextBuffer::new("red");
            op.apply(&mut buffer, &mut Mt19937::from_seed_int(seed)).unwrap();
            let out = buffer.to_string();
            assert!(out == "crimson" || out == "scarlet", "{out}");
        }
    }

    #[test]
    fn test_partial_rate_replaces_truncated_count() {
        let op = Jargoyle {
            lexemes: lexemes(),
            mode: DriftMode::Literal,
            rate: 0.5,
        };
        let mut buffer = TextBuffer::new("red red red");
        op.apply(&mut buffer, &mut Mt19937::from_seed_int(2)).unwrap();
        assert_eq!(buffer.words().filter(|word| *word == "crimson").count(), 1);
    }
}
