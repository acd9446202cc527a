use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;

use garble_core::buffer::TextBuffer;
use garble_core::rng::{shuffle, RandomSource};
use garble_core::{GarbleError, Result};

use crate::traits::GlitchOp;

/// Glyph sequences a character recogniser commonly confuses.
const CONFUSIONS: &[(&str, &[&str])] = &[
    ("rn", &["m"]),
    ("m", &["rn"]),
    ("cl", &["d"]),
    ("d", &["cl"]),
    ("vv", &["w"]),
    ("w", &["vv"]),
    ("nn", &["m"]),
    ("ri", &["n"]),
    ("ii", &["u"]),
    ("fi", &["fl"]),
    ("l", &["1", "I", "|"]),
    ("I", &["l", "1"]),
    ("1", &["l", "I"]),
    ("O", &["0"]),
    ("0", &["O"]),
    ("o", &["0"]),
    ("S", &["5"]),
    ("5", &["S"]),
    ("B", &["8"]),
    ("8", &["B"]),
    ("Z", &["2"]),
    ("2", &["Z"]),
    ("g", &["9", "q"]),
    ("q", &["9", "g"]),
    ("h", &["b"]),
    ("b", &["h", "6"]),
    ("e", &["c"]),
    ("c", &["e"]),
    ("u", &["v"]),
    ("v", &["u"]),
];

static AUTOMATON: Lazy<std::result::Result<AhoCorasick, aho_corasick::BuildError>> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(CONFUSIONS.iter().map(|(pattern, _)| *pattern))
});

fn compiled() -> Result<&'static AhoCorasick> {
    AUTOMATON
        .as_ref()
        .map_err(|err| GarbleError::precondition(format!("invalid confusion table: {err}")))
}

/// OCR-style glyph confusions (`rn` ↔ `m`, `l` → `1`, `O` → `0`, …).
///
/// Every table match in every segment is a candidate. The candidate order is
/// shuffled in full, then walked until `floor(candidates × rate)` matches are
/// chosen, skipping any that overlap an earlier choice.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, OcrArtifacts};
///
/// let mut buffer = TextBuffer::new("modern");
/// OcrArtifacts { rate: 0.0 }.apply(&mut buffer, &mut Mt19937::from_seed_int(1)).unwrap();
/// assert_eq!(buffer.to_string(), "modern");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrArtifacts {
    /// Fraction of matches replaced
    pub rate: f64,
}

struct Candidate {
    segment: usize,
    start: usize,
    end: usize,
    pattern: usize,
}

impl GlitchOp for OcrArtifacts {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let automaton = compiled()?;

        let mut candidates = Vec::new();
        for (segment, seg) in buffer.segments().iter().enumerate() {
            for found in automaton.find_iter(seg.text()) {
                candidates.push(Candidate {
                    segment,
                    start: found.start(),
                    end: found.end(),
                    pattern: found.pattern().as_usize(),
                });
            }
        }
        if candidates.is_empty() {
            return Ok(());
        }

        let to_select = (candidates.len() as f64 * self.rate).floor() as usize;
        if to_select == 0 {
            return Ok(());
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        shuffle(rng, &mut order)?;

        let mut chosen: BTreeMap<usize, Vec<(usize, usize, &'static str)>> = BTreeMap::new();
        let mut selected = 0usize;
        for slot in order {
            if selected >= to_select {
                break;
            }
            let candidate = &candidates[slot];
            let choices = CONFUSIONS[candidate.pattern].1;
            if choices.is_empty() {
                continue;
            }
            let taken = chosen.entry(candidate.segment).or_default();
            if taken
                .iter()
                .any(|&(start, end, _)| candidate.start < end && start < candidate.end)
            {
                continue;
            }
            let choice = rng.range(choices.len())?;
            taken.push((candidate.start, candidate.end, choices[choice]));
            selected += 1;
        }
        tracing::trace!(candidates = candidates.len(), selected, "ocr");

        let mut replacements = Vec::with_capacity(chosen.len());
        for (segment, mut edits) in chosen {
            if edits.is_empty() {
                continue;
            }
            edits.sort_unstable_by_key(|&(start, _, _)| start);
            let text = buffer.segments()[segment].text();
            let mut out = String::with_capacity(text.len() + edits.len());
            let mut cursor = 0;
            for (start, end, replacement) in edits {
                out.push_str(&text[cursor..start]);
                out.push_str(replacement);
                cursor = end;
            }
            out.push_str(&text[cursor..]);
            replacements.push((segment, out));
        }
        buffer.replace_segments_bulk(replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    fn run(text: &str, rate: f64, seed: i128) -> String {
        let mut buffer = TextBuffer::new(text);
        OcrArtifacts { rate }
            .apply(&mut buffer, &mut Mt19937::from_seed_int(seed))
            .unwrap();
        buffer.to_string()
    }

    #[test]
    fn test_leftmost_longest_prefers_digraph() {
        let automaton = compiled().unwrap();
        let found: Vec<&str> = automaton
            .find_iter("corn")
            .map(|m| CONFUSIONS[m.pattern().as_usize()].0)
            .collect();
        assert_eq!(found, vec!["c", "o", "rn"]);
    }

    #[test]
    fn test_confusion_table_compiles_every_pattern() {
        let automaton = compiled().unwrap();
        assert_eq!(automaton.patterns_len(), CONFUSIONS.len());
        assert_eq!(automaton.match_kind(), MatchKind::LeftmostLongest);
    }

    #[test]
    fn test_full_rate_replaces_every_match() {
        assert_eq!(run("rn", 1.0, 4), "m");
        assert_eq!(run("cl cl", 1.0, 4), "d d");
    }

    #[test]
    fn test_no_matches_is_identity() {
        assert_eq!(run("xyz", 1.0, 4), "xyz");
        assert_eq!(run("", 1.0, 4), "");
    }

    #[test]
    fn test_separators_preserved() {
        let out = run("hello   world", 0.5, 9);
        assert!(out.contains("   "));
        assert_eq!(out.split_whitespace().count(), 2);
    }

    #[test]
    fn test_deterministic() {
        let text = "Bold clean modern lines";
        assert_eq!(run(text, 0.4, 21), run(text, 0.4, 21));
    }
}
