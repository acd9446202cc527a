//! Candidate weighting and weighted selection shared by the word operations.

use std::cmp::Ordering;

use garble_core::rng::RandomSource;
use garble_core::{GarbleError, Result};

/// Length used to weight a word: core characters, falling back to the
/// trimmed word and finally to one.
pub fn core_length_for_weight(core: &str, original: &str) -> usize {
    let mut length = if core.is_empty() {
        original.chars().count()
    } else {
        core.chars().count()
    };
    if length == 0 {
        let trimmed = original.trim();
        length = if trimmed.is_empty() {
            original.chars().count()
        } else {
            trimmed.chars().count()
        };
    }
    length.max(1)
}

/// Weight favouring short words.
#[inline]
pub fn inverse_length_weight(core: &str, original: &str) -> f64 {
    1.0 / core_length_for_weight(core, original) as f64
}

/// Weight favouring long words.
#[inline]
pub fn direct_length_weight(core: &str, original: &str) -> f64 {
    core_length_for_weight(core, original) as f64
}

/// Per-candidate acceptance probability scaled by relative weight.
///
/// A rate of one accepts everything; otherwise the rate is scaled by the
/// candidate's weight relative to the mean and capped at one.
pub fn selection_probability(rate: f64, weight: f64, mean_weight: f64) -> f64 {
    if rate >= 1.0 {
        1.0
    } else if mean_weight <= f64::EPSILON {
        rate
    } else {
        (rate * (weight / mean_weight)).min(1.0)
    }
}

/// Mean of the candidate weights, zero when there are none.
pub fn mean_weight(weights: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = weights.len();
    if count == 0 {
        return 0.0;
    }
    weights.sum::<f64>() / count as f64
}

/// Weighted sampling without replacement (Efraimidis-Spirakis).
///
/// Draws one `random()` per item in order and keeps the `k` items with the
/// largest `ln(u) / w` keys. Returned identifiers are in no particular
/// order.
///
/// # Errors
/// Returns `GarbleError::Precondition` when `k` exceeds the item count.
pub fn weighted_sample_without_replacement(
    rng: &mut dyn RandomSource,
    items: &[(usize, f64)],
    k: usize,
) -> Result<Vec<usize>> {
    if k == 0 || items.is_empty() {
        return Ok(Vec::new());
    }
    if k > items.len() {
        return Err(GarbleError::precondition(format!(
            "cannot select {k} of {} candidates",
            items.len()
        )));
    }

    let mut keyed: Vec<(usize, f64)> = items
        .iter()
        .map(|&(id, weight)| {
            let w = weight.max(f64::EPSILON);
            let u = rng.random();
            let key = if u > 0.0 { u.ln() / w } else { f64::NEG_INFINITY };
            (id, key)
        })
        .collect();

    if k < keyed.len() {
        let pivot = keyed.len() - k;
        keyed.select_nth_unstable_by(pivot, |a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        keyed.drain(..pivot);
    }
    Ok(keyed.into_iter().map(|(id, _)| id).collect())
}
