//! Scores how naturally each word of a text could be stretched.
//!
//! The text is split into alternating word and non-word tokens. Each
//! eligible word gets five features in `[0, 1]` (lexical prior,
//! part-of-speech cue, sentiment, phonotactics, punctuation context) that
//! combine into a weighted score. Words scoring below
//! [`MIN_SCORE`] are not candidates.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use garble_core::rng::RandomSource;
use garble_core::{GarbleError, Result};

use super::lexicon::{
    DEFAULT_PRIOR, EVALUATIVES, INTENSIFIERS, INTERJECTIONS, LEXICAL_PRIOR, NEGATIVE, POSITIVE,
};

/// Candidates below this score are dropped.
pub const MIN_SCORE: f64 = 0.18;

/// At most this many candidates per clause are considered.
const CLAUSE_CAP: usize = 4;

const WEIGHTS: Features = Features {
    lexical: 0.32,
    pos: 0.18,
    sentiment: 0.14,
    phonotactic: 0.22,
    context: 0.14,
    sentiment_swing: 0.0,
};

const CLAUSE_PUNCTUATION: &[char] = &['.', '?', '!', ';'];
const PHONOTACTIC_DIGRAPHS: &[&str] = &[
    "aa", "ae", "ai", "ay", "ee", "ei", "ey", "ie", "oa", "oe", "oi", "oo", "ou", "ue", "ui",
];
const SIBILANT_ENDINGS: &[&str] = &["s", "z", "x", "c", "j", "sh", "zh"];

static TOKEN: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"\w+|\W+"));
static VOWEL_RUN: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"[aeiouy]{2,}"));

fn compiled(
    pattern: &'static Lazy<std::result::Result<Regex, regex::Error>>,
) -> Result<&'static Regex> {
    pattern
        .as_ref()
        .map_err(|err| GarbleError::precondition(format!("invalid built-in pattern: {err}")))
}

/// One piece of the tokenised text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub is_word: bool,
    pub clause: usize,
    /// Char offset of the token in the text
    pub start: usize,
}

/// Per-word feature values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub lexical: f64,
    pub pos: f64,
    pub sentiment: f64,
    pub phonotactic: f64,
    pub context: f64,
    pub sentiment_swing: f64,
}

impl Features {
    fn composite(&self) -> f64 {
        let total = WEIGHTS.lexical + WEIGHTS.pos + WEIGHTS.sentiment + WEIGHTS.phonotactic + WEIGHTS.context;
        let weighted = WEIGHTS.lexical * self.lexical
            + WEIGHTS.pos * self.pos
            + WEIGHTS.sentiment * self.sentiment
            + WEIGHTS.phonotactic * self.phonotactic
            + WEIGHTS.context * self.context;
        (weighted / total).clamp(0.0, 1.0)
    }

    /// How far a selected word should be stretched, in `[0, 1.5]`.
    pub fn intensity(&self) -> f64 {
        let emphasis = 0.6 * self.context + 0.4 * self.sentiment_swing;
        (0.5 * (self.lexical + self.phonotactic) + emphasis).clamp(0.0, 1.5)
    }
}

/// An eligible word with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index into the token list
    pub token: usize,
    pub start: usize,
    pub clause: usize,
    pub score: f64,
    pub features: Features,
}

/// Splits `text` into word and non-word runs, tagging clause numbers.
pub fn tokenise(text: &str) -> Result<Vec<Token>> {
    let pattern = compiled(&TOKEN)?;
    let mut tokens = Vec::new();
    let mut clause = 0;
    let mut start = 0;
    for found in pattern.find_iter(text) {
        let piece = found.as_str();
        let is_word = piece.chars().any(|c| c.is_ascii_alphabetic())
            && piece.chars().all(char::is_alphanumeric);
        tokens.push(Token {
            text: piece.to_string(),
            is_word,
            clause,
            start,
        });
        start += piece.chars().count();
        if piece.contains(CLAUSE_PUNCTUATION) {
            clause += 1;
        }
    }
    Ok(tokens)
}

fn is_all_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn is_title_case(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    first.is_uppercase()
        && rest.chars().any(char::is_lowercase)
        && !rest.chars().any(char::is_uppercase)
}

fn starts_clause(tokens: &[Token], index: usize) -> bool {
    if index == 0 {
        return true;
    }
    tokens[..index]
        .iter()
        .rev()
        .map(|token| token.text.trim())
        .find(|text| !text.is_empty())
        .map_or(true, |text| text.ends_with(CLAUSE_PUNCTUATION))
}

fn excluded(tokens: &[Token], index: usize) -> bool {
    let text = tokens[index].text.as_str();
    let lowered = text.to_lowercase();
    text.chars().filter(|c| c.is_alphabetic()).count() < 2
        || text.chars().any(char::is_numeric)
        || ["http", "www", "//"].iter().any(|marker| lowered.contains(marker))
        || text.contains(['#', '@', '&', '{', '}', '<', '>', '_', '/', '\\'])
        || (is_title_case(text) && !starts_clause(tokens, index))
}

fn pos_score(text: &str, lowered: &str) -> f64 {
    if INTERJECTIONS.contains(lowered) {
        0.95
    } else if INTENSIFIERS.contains(lowered) {
        0.85
    } else if EVALUATIVES.contains(lowered) {
        0.7
    } else if lowered.ends_with("ly") {
        0.55
    } else if is_all_upper(text) && text.chars().count() > 1 {
        0.65
    } else {
        0.3
    }
}

/// Returns `(score, swing)` from the words around `index`.
fn sentiment(tokens: &[Token], index: usize) -> (f64, f64) {
    let window = &tokens[index.saturating_sub(2)..(index + 3).min(tokens.len())];
    let mut total = 0usize;
    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in window.iter().filter(|token| token.is_word) {
        let lowered = token.text.to_lowercase();
        total += 1;
        if POSITIVE.contains(lowered.as_str()) {
            positive += 1;
        }
        if NEGATIVE.contains(lowered.as_str()) {
            negative += 1;
        }
    }
    if total == 0 {
        return (0.5, 0.0);
    }
    let balance = (positive as f64 - negative as f64) / total as f64;
    (0.5 + 0.5 * balance.clamp(-1.0, 1.0), balance.abs())
}

/// Contains `x y x` with `x != y`.
fn has_alternation(chars: &[char]) -> bool {
    chars
        .windows(3)
        .any(|window| window[0] == window[2] && window[0] != window[1])
}

fn phonotactic(lowered: &str) -> Result<f64> {
    if !lowered.contains(|c: char| "aeiouy".contains(c)) {
        return Ok(0.0);
    }
    let mut score: f64 = 0.25;
    if lowered.ends_with(|c: char| "rlmnwyh".contains(c)) {
        score += 0.2;
    }
    if SIBILANT_ENDINGS.iter().any(|ending| lowered.ends_with(ending)) {
        score += 0.18;
    }
    if PHONOTACTIC_DIGRAPHS.iter().any(|digraph| lowered.contains(digraph)) {
        score += 0.22;
    }
    if compiled(&VOWEL_RUN)?.is_match(lowered) {
        score += 0.22;
    }
    let chars: Vec<char> = lowered.chars().collect();
    if has_alternation(&chars) {
        score += 0.08;
    }
    Ok(score.clamp(0.0, 1.0))
}

fn has_emoji(text: &str) -> bool {
    text.chars().any(|c| ('\u{1F300}'..='\u{1FAFF}').contains(&c))
}

fn context(tokens: &[Token], index: usize) -> f64 {
    let text = tokens[index].text.as_str();
    let before = index
        .checked_sub(1)
        .map_or("", |previous| tokens[previous].text.as_str());
    let after = tokens.get(index + 1).map_or("", |next| next.text.as_str());

    let mut score: f64 = 0.2;
    if after.contains('!') {
        score += 0.25;
    }
    if after.contains('?') {
        score += 0.2;
    }
    if before.matches('!').count() >= 2 {
        score += 0.2;
    }
    if after.contains("!!") || after.contains("??") {
        score += 0.15;
    }
    if is_all_upper(text) && text.chars().count() > 1 {
        score += 0.25;
    }
    if has_emoji(before) || has_emoji(after) {
        score += 0.15;
    }
    if ["!!!", "??", "?!"].iter().any(|run| after.contains(run)) {
        score += 0.2;
    }
    score.clamp(0.0, 1.0)
}

fn features(tokens: &[Token], index: usize) -> Result<Features> {
    let text = tokens[index].text.as_str();
    let lowered = text.to_lowercase();
    let (sentiment, sentiment_swing) = sentiment(tokens, index);
    Ok(Features {
        lexical: LEXICAL_PRIOR
            .get(lowered.as_str())
            .copied()
            .unwrap_or(DEFAULT_PRIOR),
        pos: pos_score(text, &lowered),
        sentiment,
        phonotactic: phonotactic(&lowered)?,
        context: context(tokens, index),
        sentiment_swing,
    })
}

/// Scores every eligible word, keeping those at or above [`MIN_SCORE`].
pub fn analyse(tokens: &[Token]) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if !token.is_word || excluded(tokens, index) {
            continue;
        }
        let features = features(tokens, index)?;
        let score = features.composite();
        if score < MIN_SCORE {
            continue;
        }
        candidates.push(Candidate {
            token: index,
            start: token.start,
            clause: token.clause,
            score,
            features,
        });
    }
    Ok(candidates)
}

fn by_score(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    b.score.total_cmp(&a.score).then(a.start.cmp(&b.start))
}

fn quota(len: usize, rate: f64) -> usize {
    ((len as f64 * rate).round_ties_even().max(0.0) as usize).min(len)
}

/// Chooses which candidates to stretch.
///
/// Each clause offers its best few candidates, which pass a score-weighted
/// coin flip until the clause quota is met. Shortfalls are filled from the
/// clause's leftovers, then from the best remaining candidates overall.
/// The result is in text order.
pub fn select(candidates: &[Candidate], rate: f64, rng: &mut dyn RandomSource) -> Vec<Candidate> {
    if candidates.is_empty() || rate <= 0.0 {
        return Vec::new();
    }

    let mut clauses: BTreeMap<usize, Vec<&Candidate>> = BTreeMap::new();
    for candidate in candidates {
        clauses.entry(candidate.clause).or_default().push(candidate);
    }
    let expected = quota(candidates.len(), rate);

    let mut selected: Vec<&Candidate> = Vec::new();
    for mut members in clauses.into_values() {
        members.sort_by(|a, b| by_score(a, b));
        members.truncate(CLAUSE_CAP);
        let clause_quota = quota(members.len(), rate);

        let mut provisional: Vec<&Candidate> = Vec::new();
        for &candidate in &members {
            let probability = (rate * (0.35 + 0.65 * candidate.score)).min(1.0);
            if rng.random() < probability {
                provisional.push(candidate);
            }
            if provisional.len() >= clause_quota {
                break;
            }
        }
        if provisional.len() < clause_quota {
            let chosen: HashSet<usize> = provisional.iter().map(|c| c.token).collect();
            let leftovers = members.iter().filter(|c| !chosen.contains(&c.token));
            provisional.extend(leftovers.take(clause_quota - provisional.len()));
        }
        selected.extend(provisional);
    }

    if selected.len() < expected {
        let chosen: HashSet<usize> = selected.iter().map(|c| c.token).collect();
        let mut remaining: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| !chosen.contains(&c.token))
            .collect();
        remaining.sort_by(|a, b| by_score(a, b));
        let shortfall = expected - selected.len();
        selected.extend(remaining.into_iter().take(shortfall));
    }

    selected.sort_by_key(|candidate| candidate.start);
    selected.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    #[test]
    fn test_tokens_cover_text_and_track_clauses() {
        let tokens = tokenise("so cool! really? yes").unwrap();
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, "so cool! really? yes");
        let clauses: Vec<usize> = tokens.iter().filter(|t| t.is_word).map(|t| t.clause).collect();
        assert_eq!(clauses, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_exclusions() {
        let tokens = tokenise("I saw Paris and abc123 then x").unwrap();
        let candidates = analyse(&tokens).unwrap();
        let words: Vec<&str> = candidates
            .iter()
            .map(|c| tokens[c.token].text.as_str())
            .collect();
        assert!(!words.contains(&"I"));
        assert!(!words.contains(&"Paris"));
        assert!(!words.contains(&"abc123"));
        assert!(!words.contains(&"x"));
    }

    #[test]
    fn test_title_case_allowed_at_clause_start() {
        let tokens = tokenise("Wow. Cool").unwrap();
        let candidates = analyse(&tokens).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_exclamation_raises_context() {
        let tokens = tokenise("so good!!!").unwrap();
        let calm = tokenise("so good").unwrap();
        assert!(context(&tokens, 2) > context(&calm, 2));
    }

    #[test]
    fn test_phonotactic_features() {
        assert_eq!(phonotactic("hmm").unwrap(), 0.0);
        assert!(phonotactic("cool").unwrap() > phonotactic("cat").unwrap());
        assert!(has_alternation(&['a', 'n', 'a']));
        assert!(!has_alternation(&['a', 'a', 'a']));
    }

    #[test]
    fn test_full_rate_selects_in_text_order() {
        let tokens = tokenise("wow so cool. yes really nice. oh hey love").unwrap();
        let candidates = analyse(&tokens).unwrap();
        let selected = select(&candidates, 1.0, &mut Mt19937::from_seed_int(3));
        assert_eq!(selected.len(), candidates.len().min(CLAUSE_CAP * 3));
        assert!(selected.windows(2).all(|pair| pair[0].start < pair[1].start));
    }

    #[test]
    fn test_zero_rate_selects_nothing() {
        let tokens = tokenise("wow so cool").unwrap();
        let candidates = analyse(&tokens).unwrap();
        assert!(select(&candidates, 0.0, &mut Mt19937::from_seed_int(3)).is_empty());
    }
}
