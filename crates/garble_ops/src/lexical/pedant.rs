use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::text::transfer_casing;
use garble_core::{GarbleError, Result};

use crate::traits::GlitchOp;

const KILOMETRES_PER_MILE: f64 = 1.60934;
const DIAERESIS_PROBABILITY: f64 = 0.5;
const LIGATURE_PROBABILITY: f64 = 0.6;

type Pattern = Lazy<std::result::Result<Regex, regex::Error>>;

static WHO: Pattern = Lazy::new(|| Regex::new(r"(?i)\bwho\b"));
static OR_LESS: Pattern =
    Lazy::new(|| Regex::new(r"(?i)(\b(?:\d[\d,]*|many|few)\b[^.?!]*?\b)(or)(\s+)(less)\b"));
static COOPERATE: Pattern = Lazy::new(|| Regex::new(r"(?i)cooperate"));
static COORDINATE: Pattern = Lazy::new(|| Regex::new(r"(?i)coordinate"));
static AE: Pattern = Lazy::new(|| Regex::new("ae"));
static IF_WAS: Pattern = Lazy::new(|| Regex::new(r"(?i)\b(if\s+(?:i|he|she|it)\s+)(was)\b"));
static SERIAL: Pattern = Lazy::new(|| Regex::new(r"(?i)(\w+,\s+\w+)(\s+(?:and|or)\s+\w+)"));
static MILES: Pattern = Lazy::new(|| Regex::new(r"(?i)\b(\d[\d,]*)\s+(miles?)\b"));

fn compiled(pattern: &'static Pattern) -> Result<&'static Regex> {
    pattern
        .as_ref()
        .map_err(|err| GarbleError::precondition(format!("invalid built-in pattern: {err}")))
}

/// A grammar hypercorrection applied by [`Pedant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Stone {
    /// `who` → `whom`, everywhere
    WhomStone,
    /// `… or less` after a count, `many` or `few` → `… or fewer`, within a sentence
    Fewerite,
    /// `coöperate`, sometimes `coördinate`, and `ae` → `æ`
    Aetherite,
    /// `if I was` → `if I were`
    Subjunctite,
    /// Serial comma before the final `and`/`or` of a list
    Oxfordium,
    /// Everything in capitals
    Orthogonite,
    /// Miles converted to whole kilometres
    Metricite,
}

impl Stone {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::WhomStone => "Whom Stone",
            Self::Fewerite => "Fewerite",
            Self::Aetherite => "Aetherite",
            Self::Subjunctite => "Subjunctite",
            Self::Oxfordium => "Oxfordium",
            Self::Orthogonite => "Orthogonite",
            Self::Metricite => "Metricite",
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stone {
    type Err = GarbleError;

    /// Accepts display names case-insensitively, ignoring spaces, hyphens and
    /// underscores (`"Whom Stone"`, `"whom_stone"`, `"whom"`).
    fn from_str(value: &str) -> Result<Self> {
        let key: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "whom" | "whomstone" => Ok(Self::WhomStone),
            "fewerite" => Ok(Self::Fewerite),
            "aetherite" => Ok(Self::Aetherite),
            "subjunctite" => Ok(Self::Subjunctite),
            "oxfordium" => Ok(Self::Oxfordium),
            "orthogonite" => Ok(Self::Orthogonite),
            "metricite" => Ok(Self::Metricite),
            _ => Err(GarbleError::precondition(format!("unknown pedant stone: {value}"))),
        }
    }
}

impl TryFrom<String> for Stone {
    type Error = GarbleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Stone> for String {
    fn from(stone: Stone) -> Self {
        stone.name().to_string()
    }
}

/// Applies one pedantic "correction" to the whole text.
///
/// Only [`Stone::Aetherite`] draws from the random source; every other stone
/// is a pure rewrite.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, Pedant, Stone};
///
/// let mut buffer = TextBuffer::new("Who knew? If I was you, 3 items or less.");
/// for stone in [Stone::WhomStone, Stone::Subjunctite, Stone::Fewerite] {
///     Pedant { stone }.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
/// }
/// assert_eq!(buffer.to_string(), "Whom knew? If I were you, 3 items or fewer.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pedant {
    /// Correction to apply
    pub stone: Stone,
}

fn whom(text: &str) -> Result<String> {
    Ok(compiled(&WHO)?
        .replace_all(text, |caps: &Captures<'_>| transfer_casing(&caps[0], "whom"))
        .into_owned())
}

fn fewer(text: &str) -> Result<String> {
    Ok(compiled(&OR_LESS)?
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], transfer_casing(&caps[4], "fewer"))
        })
        .into_owned())
}

fn were(text: &str) -> Result<String> {
    Ok(compiled(&IF_WAS)?
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}{}", &caps[1], transfer_casing(&caps[2], "were"))
        })
        .into_owned())
}

fn serial_comma(text: &str) -> Result<String> {
    Ok(compiled(&SERIAL)?.replace_all(text, "$1,$2").into_owned())
}

fn format_kilometres(kilometres: f64, unit: &str) -> String {
    let noun = if kilometres == 1.0 { "kilometre" } else { "kilometres" };
    format!("{kilometres:.0} {}", transfer_casing(unit, noun))
}

fn metricate(text: &str) -> Result<String> {
    Ok(compiled(&MILES)?
        .replace_all(text, |caps: &Captures<'_>| {
            match caps[1].replace(',', "").parse::<u64>() {
                Ok(miles) => {
                    let kilometres = (miles as f64 * KILOMETRES_PER_MILE).round_ties_even();
                    format_kilometres(kilometres, &caps[2])
                }
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned())
}

fn is_all_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn starts_upper(word: &str) -> bool {
    word.starts_with(char::is_uppercase)
}

fn cooperate_form(word: &str) -> &'static str {
    if is_all_upper(word) {
        "COÖPERATE"
    } else if starts_upper(word) {
        "Coöperate"
    } else {
        "coöperate"
    }
}

fn diaeresis(word: &str) -> String {
    if is_all_upper(word) {
        word.replacen("OO", "OÖ", 1)
    } else if starts_upper(word) {
        word.replacen("oo", "oö", 1).replacen("Oo", "Öo", 1)
    } else {
        word.replacen("oo", "oö", 1)
    }
}

fn aetherise(text: &str, rng: &mut dyn RandomSource) -> Result<String> {
    let cooperated = compiled(&COOPERATE)?.replace_all(text, |caps: &Captures<'_>| cooperate_form(&caps[0]));
    let coordinated = compiled(&COORDINATE)?.replace_all(&cooperated, |caps: &Captures<'_>| {
        if rng.random() < DIAERESIS_PROBABILITY {
            diaeresis(&caps[0])
        } else {
            caps[0].to_string()
        }
    });

    let starts: Vec<usize> = compiled(&AE)?.find_iter(&coordinated).map(|found| found.start()).collect();
    if starts.is_empty() {
        return Ok(coordinated.into_owned());
    }

    let mut chosen: Vec<bool> = starts.iter().map(|_| rng.random() < LIGATURE_PROBABILITY).collect();
    if !chosen.iter().any(|flag| *flag) {
        let index = rng.range(starts.len())?;
        chosen[index] = true;
    }

    let mut out = String::with_capacity(coordinated.len());
    let mut cursor = 0;
    for (&start, picked) in starts.iter().zip(chosen) {
        if picked {
            out.push_str(&coordinated[cursor..start]);
            out.push('æ');
            cursor = start + 2;
        }
    }
    out.push_str(&coordinated[cursor..]);
    Ok(out)
}

impl GlitchOp for Pedant {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let text = buffer.to_string();
        if text.is_empty() {
            return Ok(());
        }
        let corrected = match self.stone {
            Stone::WhomStone => whom(&text)?,
            Stone::Fewerite => fewer(&text)?,
            Stone::Aetherite => aetherise(&text, rng)?,
            Stone::Subjunctite => were(&text)?,
            Stone::Oxfordium => serial_comma(&text)?,
            Stone::Orthogonite => text.to_uppercase(),
            Stone::Metricite => metricate(&text)?,
        };
        if corrected == text {
            return Ok(());
        }
        tracing::trace!(stone = %self.stone, "pedant");
        buffer.replace_char_range(0..buffer.byte_len(), &corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    fn run(stone: Stone, text: &str, seed: i128) -> String {
        let mut buffer = TextBuffer::new(text);
        Pedant { stone }
            .apply(&mut buffer, &mut Mt19937::from_seed_int(seed))
            .unwrap();
        buffer.to_string()
    }

    #[test]
    fn test_stone_names_parse() {
        assert_eq!("Whom Stone".parse::<Stone>().unwrap(), Stone::WhomStone);
        assert_eq!("whom_stone".parse::<Stone>().unwrap(), Stone::WhomStone);
        assert_eq!("METRICITE".parse::<Stone>().unwrap(), Stone::Metricite);
        assert!("Moonstone".parse::<Stone>().is_err());
    }

    #[test]
    fn test_whom_keeps_case_and_word_boundaries() {
        assert_eq!(run(Stone::WhomStone, "WHO is whoever, who?", 0), "WHOM is whoever, whom?");
    }

    #[test]
    fn test_fewer_needs_a_count() {
        assert_eq!(run(Stone::Fewerite, "10 words or less", 0), "10 words or fewer");
        assert_eq!(run(Stone::Fewerite, "more or less", 0), "more or less");
    }

    #[test]
    fn test_fewer_spans_several_words_and_quantifiers() {
        assert_eq!(run(Stone::Fewerite, "10 small items or less", 0), "10 small items or fewer");
        assert_eq!(run(Stone::Fewerite, "many items or less", 0), "many items or fewer");
        assert_eq!(run(Stone::Fewerite, "Few guests, OR LESS", 0), "Few guests, OR FEWER");
    }

    #[test]
    fn test_fewer_stops_at_sentence_end() {
        let text = "We sold 10 items. It was more or less fine.";
        assert_eq!(run(Stone::Fewerite, text, 0), text);
    }

    #[test]
    fn test_subjunctive() {
        assert_eq!(run(Stone::Subjunctite, "if she was there", 0), "if she were there");
        assert_eq!(run(Stone::Subjunctite, "she was there", 0), "she was there");
    }

    #[test]
    fn test_oxford_comma() {
        assert_eq!(
            run(Stone::Oxfordium, "red, green and blue", 0),
            "red, green, and blue"
        );
        assert_eq!(run(Stone::Oxfordium, "red and blue", 0), "red and blue");
    }

    #[test]
    fn test_orthogonite_upper_cases() {
        assert_eq!(run(Stone::Orthogonite, "quiet please", 0), "QUIET PLEASE");
    }

    #[test]
    fn test_metricite_whole_kilometres() {
        assert_eq!(run(Stone::Metricite, "walk 5 miles", 0), "walk 8 kilometres");
        assert_eq!(run(Stone::Metricite, "1 mile", 0), "2 kilometres");
        assert_eq!(format_kilometres(1.0, "mile"), "1 kilometre");
        assert_eq!(format_kilometres(0.0, "miles"), "0 kilometres");
    }

    #[test]
    fn test_metricite_grouped_digits_and_casing() {
        assert_eq!(run(Stone::Metricite, "we drove 1,000 miles", 0), "we drove 1609 kilometres");
        assert_eq!(run(Stone::Metricite, "3 Miles", 0), "5 Kilometres");
        assert_eq!(run(Stone::Metricite, "12 MILES", 0), "19 KILOMETRES");
    }

    #[test]
    fn test_aetherite_always_ligates_something() {
        for seed in 0..20 {
            let out = run(Stone::Aetherite, "an aesthetic encyclopaedia", seed);
            assert!(out.contains('æ'), "seed {seed}: {out}");
        }
    }

    #[test]
    fn test_ligature_only_lower_case_digraph() {
        for seed in 0..10 {
            assert_eq!(run(Stone::Aetherite, "AESTHETIC Aeon", seed), "AESTHETIC Aeon");
        }
        assert_eq!(run(Stone::Aetherite, "archaeology", 3), "archæology");
    }

    #[test]
    fn test_cooperate_always_gains_diaeresis() {
        for seed in 0..20 {
            assert_eq!(run(Stone::Aetherite, "we cooperate", seed), "we coöperate");
        }
        assert_eq!(run(Stone::Aetherite, "COOPERATE", 1), "COÖPERATE");
        assert_eq!(run(Stone::Aetherite, "Cooperate", 1), "Coöperate");
    }

    #[test]
    fn test_coordinate_diaeresis_is_a_coin_flip() {
        let outcomes: Vec<String> = (0..20).map(|seed| run(Stone::Aetherite, "we coordinate", seed)).collect();
        assert!(outcomes.iter().any(|out| out == "we coördinate"));
        assert!(outcomes.iter().any(|out| out == "we coordinate"));
        assert_eq!(diaeresis("Coordinate"), "Coördinate");
        assert_eq!(diaeresis("COORDINATE"), "COÖRDINATE");
    }

    #[test]
    fn test_diaeresis_is_deterministic() {
        let text = "We cooperate and coordinate.";
        let out = run(Stone::Aetherite, text, 4);
        assert_eq!(out, run(Stone::Aetherite, text, 4));
        assert_eq!(out.replace('ö', "o"), text);
    }
}
