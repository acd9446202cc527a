use std::collections::HashMap;

use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::{split_affixes, transfer_casing};
use garble_core::Result;

use crate::traits::GlitchOp;

const GROUPS: &[&[&str]] = &[
    &["there", "their", "they're"],
    &["to", "too", "two"],
    &["your", "you're"],
    &["its", "it's"],
    &["whose", "who's"],
    &["then", "than"],
    &["affect", "effect"],
    &["accept", "except"],
    &["hear", "here"],
    &["know", "no"],
    &["knew", "new"],
    &["write", "right", "rite"],
    &["weather", "whether"],
    &["whole", "hole"],
    &["hour", "our"],
    &["peace", "piece"],
    &["plain", "plane"],
    &["principal", "principle"],
    &["stationary", "stationery"],
    &["complement", "compliment"],
    &["brake", "break"],
    &["buy", "by", "bye"],
    &["cite", "site", "sight"],
    &["sea", "see"],
    &["sun", "son"],
    &["week", "weak"],
    &["wear", "where", "ware"],
    &["which", "witch"],
    &["would", "wood"],
    &["flour", "flower"],
    &["allowed", "aloud"],
    &["bare", "bear"],
    &["board", "bored"],
    &["fair", "fare"],
    &["mail", "male"],
    &["meat", "meet"],
    &["pair", "pear", "pare"],
    &["rain", "reign", "rein"],
    &["road", "rode", "rowed"],
    &["tail", "tale"],
    &["waist", "waste"],
    &["wait", "weight"],
    &["made", "maid"],
    &["one", "won"],
    &["passed", "past"],
    &["threw", "through"],
    &["led", "lead"],
    &["lose", "loose"],
];

static LOOKUP: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    GROUPS
        .iter()
        .flat_map(|group| group.iter().map(move |word| (*word, *group)))
        .collect()
});

/// How a replacement is picked among a word's homophones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HomophoneWeighting {
    /// Every other member of the group is equally likely
    #[default]
    Flat,
}

/// Replaces words with sound-alike spellings (`their` → `there`).
///
/// Each word whose core belongs to a homophone group is replaced with
/// probability `rate`; the casing of the original core is carried over.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, Homophones};
///
/// let mut buffer = TextBuffer::new("Your dog.");
/// Homophones { rate: 1.0, ..Homophones::default() }
///     .apply(&mut buffer, &mut Mt19937::from_seed_int(0))
///     .unwrap();
/// assert_eq!(buffer.to_string(), "You're dog.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Homophones {
    /// Replacement probability per eligible word
    pub rate: f64,
    /// Choice among alternatives
    pub weighting: HomophoneWeighting,
}

impl GlitchOp for Homophones {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        if self.rate.is_nan() {
            return Ok(());
        }
        let rate = self.rate.clamp(0.0, 1.0);
        if rate <= f64::EPSILON {
            return Ok(());
        }

        let mut replacements = Vec::new();
        for (index, word) in buffer.words().enumerate() {
            let (prefix, core, suffix) = split_affixes(word);
            if core.is_empty() {
                continue;
            }
            let lowered = core.to_lowercase();
            let Some(group) = LOOKUP.get(lowered.as_str()) else {
                continue;
            };
            if rng.random() >= rate {
                continue;
            }
            let alternatives: Vec<&str> = group
                .iter()
                .copied()
                .filter(|candidate| *candidate != lowered)
                .collect();
            if alternatives.is_empty() {
                continue;
            }
            let chosen = match self.weighting {
                HomophoneWeighting::Flat => alternatives[rng.range(alternatives.len())?],
            };
            replacements.push((
                index,
                format!("{prefix}{}{suffix}", transfer_casing(core, chosen)),
            ));
        }
        tracing::trace!(replaced = replacements.len(), "homophones");
        buffer.replace_words_bulk(replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    fn run(text: &str, rate: f64, seed: i128) -> String {
        let mut buffer = TextBuffer::new(text);
        Homophones {
            rate,
            ..Homophones::default()
        }
        .apply(&mut buffer, &mut Mt19937::from_seed_int(seed))
        .unwrap();
        buffer.to_string()
    }

    #[test]
    fn test_lookup_is_symmetric() {
        for group in GROUPS {
            for word in *group {
                assert_eq!(LOOKUP[word], *group);
            }
        }
    }

    #[test]
    fn test_casing_and_affixes_preserved() {
        assert_eq!(run("(WEAK)", 1.0, 1), "(WEEK)");
        assert_eq!(run("Hear!", 1.0, 1), "Here!");
    }

    #[test]
    fn test_unknown_words_untouched() {
        assert_eq!(run("nothing matches", 1.0, 1), "nothing matches");
    }

    #[test]
    fn test_rate_zero_is_identity() {
        assert_eq!(run("their hour", 0.0, 1), "their hour");
    }

    #[test]
    fn test_three_way_group_never_returns_source() {
        for seed in 0..20 {
            let out = run("there", 1.0, seed);
            assert!(out == "their" || out == "they're", "{out}");
        }
    }
}
