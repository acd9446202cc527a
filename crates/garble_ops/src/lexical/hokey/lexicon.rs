//! Built-in lexica consulted by the stretchability scorer.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Prior used for words missing from [`LEXICAL_PRIOR`].
pub const DEFAULT_PRIOR: f64 = 0.12;

/// How readily a word is lengthened in informal writing, in `[0, 1]`.
pub static LEXICAL_PRIOR: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("so", 0.92),
        ("wow", 0.95),
        ("whoa", 0.9),
        ("yay", 0.9),
        ("yes", 0.9),
        ("no", 0.89),
        ("oh", 0.9),
        ("omg", 0.88),
        ("ugh", 0.86),
        ("lol", 0.85),
        ("hey", 0.85),
        ("hmm", 0.82),
        ("boo", 0.8),
        ("cool", 0.8),
        ("please", 0.8),
        ("really", 0.78),
        ("love", 0.75),
        ("nice", 0.72),
        ("hello", 0.72),
        ("sweet", 0.7),
        ("very", 0.7),
        ("okay", 0.7),
        ("damn", 0.7),
        ("hi", 0.7),
        ("great", 0.68),
        ("fun", 0.66),
        ("awesome", 0.66),
        ("totally", 0.65),
        ("amazing", 0.65),
        ("good", 0.64),
        ("sorry", 0.62),
        ("thanks", 0.62),
        ("happy", 0.6),
        ("sad", 0.6),
        ("sure", 0.6),
        ("huge", 0.6),
        ("god", 0.6),
        ("long", 0.58),
        ("hot", 0.58),
        ("bad", 0.55),
        ("mad", 0.55),
        ("what", 0.55),
        ("why", 0.55),
        ("stop", 0.5),
        ("right", 0.5),
    ]
    .into_iter()
    .collect()
});

fn set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// Exclamations.
pub static INTERJECTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "oh", "wow", "whoa", "yay", "ugh", "hey", "hmm", "boo", "omg", "lol", "ah", "aw", "ooh",
        "yikes", "oops", "ouch", "yes", "no", "hi", "hello", "bye",
    ])
});

/// Degree adverbs.
pub static INTENSIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "so", "very", "really", "totally", "super", "too", "such", "extremely", "absolutely",
        "literally", "way", "mega",
    ])
});

/// Judgement adjectives.
pub static EVALUATIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "good", "great", "bad", "cool", "nice", "awesome", "amazing", "terrible", "awful",
        "lovely", "sweet", "cute", "huge", "long", "fun", "weird", "crazy", "best", "worst",
    ])
});

/// Positive sentiment words.
pub static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "love", "good", "great", "nice", "awesome", "amazing", "happy", "yay", "cool", "sweet",
        "lovely", "best", "fun", "thanks", "beautiful", "glad", "wonderful", "excited",
    ])
});

/// Negative sentiment words.
pub static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    set(&[
        "hate", "bad", "terrible", "awful", "sad", "ugh", "worst", "angry", "mad", "sorry",
        "boring", "ugly", "annoying", "tired", "sick", "no", "never",
    ])
});
