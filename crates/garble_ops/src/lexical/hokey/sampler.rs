//! Stretch length sampling.

use garble_core::rng::RandomSource;

/// Draws how many extra copies of a stretch site to insert.
///
/// Repeats follow a negative binomial distribution whose shape grows and
/// success probability shrinks with intensity, so emphatic words stretch
/// further. The result is clamped to `[minimum, maximum]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeBinomialSampler {
    /// Success probability at zero intensity
    pub base_p: f64,
}

impl NegativeBinomialSampler {
    pub fn sample(
        &self,
        rng: &mut dyn RandomSource,
        intensity: f64,
        minimum: usize,
        maximum: usize,
    ) -> usize {
        let maximum = maximum.max(minimum);
        if maximum == 0 {
            return 0;
        }
        if maximum == minimum {
            return maximum;
        }

        let shape = (1.0 + 2.0 * intensity).round_ties_even().max(1.0) as usize;
        let p = (self.base_p / (1.0 + 0.75 * intensity.max(0.0))).clamp(0.05, 0.95);
        let failures: usize = (0..shape).map(|_| geometric(rng, p)).sum();
        (minimum + failures).clamp(minimum, maximum)
    }
}

/// Failures before the first success.
fn geometric(rng: &mut dyn RandomSource, p: f64) -> usize {
    let mut count = 0;
    while rng.random() > p {
        count += 1;
    }
    count
}
