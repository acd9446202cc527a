//! MT19937 generator matching CPython's `random.Random`.
//!
//! This module provides [`Mt19937`], a 32-bit Mersenne Twister whose seeding
//! and derived draws follow CPython's `_randommodule.c` and `random.py`
//! exactly. Golden vectors in the test suite pin every procedure against
//! values produced by CPython itself.

use std::collections::HashSet;
use std::fmt;

use rand::{RngCore, SeedableRng};

use super::RandomSource;
use crate::types::error::RngError;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// Snapshot of the generator's internal state (`getstate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtState {
    /// The 624 state words
    pub words: Vec<u32>,
    /// Position of the next word to temper (624 forces a twist)
    pub index: usize,
}

/// CPython-compatible Mersenne Twister.
///
/// Provides the draw procedures used by the mutation operations with the
/// exact consumption pattern of CPython's `random.Random`, so the same seed
/// produces the same mutations whichever side of the language boundary
/// drives the engine.
///
/// # Examples
///
/// ```rust
/// use garble_core::rng::{Mt19937, RandomSource};
///
/// let mut rng = Mt19937::from_seed_int(42);
/// assert_eq!(rng.random(), 0.6394267984578837);
/// assert_eq!(rng.random(), 0.025010755222666936);
///
/// let mut rng = Mt19937::from_seed_int(42);
/// let draws: Vec<usize> = (0..5).map(|_| rng.range(10).unwrap()).collect();
/// assert_eq!(draws, vec![1, 0, 4, 3, 3]);
/// ```
#[derive(Clone)]
pub struct Mt19937 {
    /// State words.
    mt: [u32; N],
    /// Next word to temper.
    index: usize,
    /// The integer seed used for initialisation (stored for reproducibility tracking).
    seed: i128,
}

impl Mt19937 {
    /// Creates a generator seeded like `random.Random(seed)`.
    ///
    /// The absolute value of `seed` is split into 32-bit little-endian words
    /// (a single zero word for zero) and fed to `init_by_array`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use garble_core::rng::{Mt19937, RandomSource};
    ///
    /// let mut a = Mt19937::from_seed_int(-7);
    /// let mut b = Mt19937::from_seed_int(7);
    /// assert_eq!(a.random(), b.random());
    /// ```
    pub fn from_seed_int(seed: i128) -> Self {
        let magnitude = seed.unsigned_abs();
        let mut key: Vec<u32> = (0..4).map(|i| (magnitude >> (32 * i)) as u32).collect();
        while key.len() > 1 && key.last() == Some(&0) {
            key.pop();
        }
        let mut rng = Self::from_key(&key);
        rng.seed = seed;
        rng
    }

    /// Creates a generator seeded from an unsigned 64-bit seed.
    ///
    /// Derived seeds are `u64`, so this is the constructor the pipeline uses.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::from_seed_int(i128::from(seed))
    }

    /// Creates a generator with the reference `init_by_array` over `key`.
    ///
    /// An empty key is treated as `[0]`.
    pub fn from_key(key: &[u32]) -> Self {
        let mut rng = Self {
            mt: [0; N],
            index: N,
            seed: 0,
        };
        if key.is_empty() {
            rng.init_by_array(&[0]);
        } else {
            rng.init_by_array(key);
        }
        rng
    }

    /// Restores a generator from a state snapshot (`setstate`).
    pub fn from_state(state: &MtState) -> Result<Self, RngError> {
        if state.words.len() != N || state.index > N {
            return Err(RngError::InvalidState {
                words: state.words.len(),
                index: state.index,
            });
        }
        let mut mt = [0u32; N];
        mt.copy_from_slice(&state.words);
        Ok(Self {
            mt,
            index: state.index,
            seed: 0,
        })
    }

    /// Returns a snapshot of the current state (`getstate`).
    pub fn state(&self) -> MtState {
        MtState {
            words: self.mt.to_vec(),
            index: self.index,
        }
    }

    /// Returns the seed used for initialisation.
    ///
    /// Generators restored with [`Mt19937::from_state`] or built with
    /// [`Mt19937::from_key`] report zero.
    #[inline]
    pub fn seed(&self) -> i128 {
        self.seed
    }

    fn init_genrand(&mut self, s: u32) {
        self.mt[0] = s;
        for i in 1..N {
            let prev = self.mt[i - 1];
            self.mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.index = N;
    }

    fn init_by_array(&mut self, key: &[u32]) {
        self.init_genrand(19_650_218);
        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..N.max(key.len()) {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
        }
        self.mt[0] = 0x8000_0000;
    }

    fn twist(&mut self) {
        for kk in 0..N {
            let y = (self.mt[kk] & UPPER_MASK) | (self.mt[(kk + 1) % N] & LOWER_MASK);
            let mag = if y & 1 == 0 { 0 } else { MATRIX_A };
            self.mt[kk] = self.mt[(kk + M) % N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }

    /// Next tempered 32-bit output (`genrand_uint32`).
    #[inline]
    pub fn next_word(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.mt[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    fn getrandbits(&mut self, k: u32) -> u128 {
        if k == 0 {
            return 0;
        }
        if k <= 32 {
            return u128::from(self.next_word() >> (32 - k));
        }
        let mut result = 0u128;
        let mut remaining = k;
        let mut shift = 0u32;
        while remaining > 0 {
            let mut word = self.next_word();
            if remaining < 32 {
                word >>= 32 - remaining;
            }
            result |= u128::from(word) << shift;
            shift += 32;
            remaining = remaining.saturating_sub(32);
        }
        result
    }

    /// `_randbelow_with_getrandbits`; `n` must be positive.
    fn randbelow(&mut self, n: u128) -> u128 {
        let k = 128 - n.leading_zeros();
        loop {
            let r = self.getrandbits(k);
            if r < n {
                return r;
            }
        }
    }

    fn randrange_wide(&mut self, start: i128, stop: i128, step: i128) -> Result<i128, RngError> {
        let empty = || RngError::EmptyRange {
            start: clamp_i64(start),
            stop: clamp_i64(stop),
        };
        let width = stop - start;
        if step == 1 {
            if width > 0 {
                return Ok(start + self.randbelow(width as u128) as i128);
            }
            return Err(empty());
        }
        let n = if step > 0 {
            floor_div(width + step - 1, step)
        } else if step < 0 {
            floor_div(width + step + 1, step)
        } else {
            return Err(RngError::ZeroStep);
        };
        if n <= 0 {
            return Err(empty());
        }
        Ok(start + step * self.randbelow(n as u128) as i128)
    }

    /// `randrange(start, stop, step)` with CPython's width and step rules.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use garble_core::rng::Mt19937;
    ///
    /// let mut rng = Mt19937::from_seed_int(42);
    /// let values: Vec<i64> = (0..3).map(|_| rng.range_step(3, 20, 4).unwrap()).collect();
    /// assert_eq!(values, vec![3, 3, 11]);
    /// ```
    pub fn range_step(&mut self, start: i64, stop: i64, step: i64) -> Result<i64, RngError> {
        self.randrange_wide(i128::from(start), i128::from(stop), i128::from(step))
            .map(|value| value as i64)
    }

    /// `randint(a, b)`: uniform integer in the closed interval `[a, b]`.
    pub fn randint(&mut self, a: i64, b: i64) -> Result<i64, RngError> {
        self.randrange_wide(i128::from(a), i128::from(b) + 1, 1)
            .map(|value| value as i64)
    }
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Size of the selection set below which `sample` uses the pool algorithm.
fn sample_setsize(k: usize) -> usize {
    let mut setsize = 21usize;
    if k > 5 {
        let exponent = ((k as f64 * 3.0).ln() / 4f64.ln()).ceil() as u32;
        setsize = setsize.saturating_add(4usize.checked_pow(exponent).unwrap_or(usize::MAX));
    }
    setsize
}

impl RandomSource for Mt19937 {
    #[inline]
    fn random(&mut self) -> f64 {
        let a = self.next_word() >> 5;
        let b = self.next_word() >> 6;
        (f64::from(a) * 67_108_864.0 + f64::from(b)) * (1.0 / 9_007_199_254_740_992.0)
    }

    fn bits(&mut self, k: u32) -> Result<u128, RngError> {
        if k > 128 {
            return Err(RngError::BitsTooWide { bits: k });
        }
        Ok(self.getrandbits(k))
    }

    fn range(&mut self, n: usize) -> Result<usize, RngError> {
        if n == 0 {
            return Err(RngError::EmptyRange { start: 0, stop: 0 });
        }
        Ok(self.randbelow(n as u128) as usize)
    }

    fn sample(&mut self, population: usize, k: usize) -> Result<Vec<usize>, RngError> {
        if k > population {
            return Err(RngError::SampleTooLarge {
                requested: k,
                population,
            });
        }
        let n = population;
        let mut result = Vec::with_capacity(k);
        if n <= sample_setsize(k) {
            let mut pool: Vec<usize> = (0..n).collect();
            for i in 0..k {
                let j = self.randbelow((n - i) as u128) as usize;
                result.push(pool[j]);
                pool[j] = pool[n - i - 1];
            }
        } else {
            let mut selected: HashSet<usize> = HashSet::with_capacity(k);
            for _ in 0..k {
                let mut j = self.randbelow(n as u128) as usize;
                while selected.contains(&j) {
                    j = self.randbelow(n as u128) as usize;
                }
                selected.insert(j);
                result.push(j);
            }
        }
        Ok(result)
    }
}

impl RngCore for Mt19937 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.getrandbits(64) as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 16];

    /// Interprets the seed bytes as a little-endian signed integer.
    fn from_seed(seed: Self::Seed) -> Self {
        Self::from_seed_int(i128::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::from_seed_u64(state)
    }
}

impl fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mt19937")
            .field("seed", &self.seed)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
