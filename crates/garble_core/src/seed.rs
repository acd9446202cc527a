//! Per-operation seed derivation.
//!
//! Every operation in a pipeline runs with its own generator, seeded from
//! the pipeline's master seed, the operation's name and its position. The
//! derivation is a pure function over a fixed-output hash, so any
//! implementation that feeds the same bytes gets the same seed.
//!
//! ## Encoding
//!
//! The hash input is
//! `int_bytes(master) ‖ 0x00 ‖ utf8(name) ‖ 0x00 ‖ int_bytes(index)`,
//! hashed with BLAKE2s using an 8-byte digest and read back as a big-endian
//! `u64`.
//!
//! ```rust
//! use garble_core::seed::derive_seed;
//!
//! assert_eq!(derive_seed(151, "Typogre", 0), 13006513535068165406);
//! assert_ne!(derive_seed(151, "Typogre", 0), derive_seed(151, "Typogre", 1));
//! ```

use blake2::digest::consts::U8;
use blake2::{Blake2s, Digest};

type Blake2s64 = Blake2s<U8>;

/// Minimal big-endian byte encoding of a signed integer.
///
/// - Zero encodes as a single `0x00` byte
/// - Positive values use the shortest unsigned big-endian form
/// - Negative values use the shortest two's-complement form, starting from
///   `ceil(bit_length / 8)` bytes and growing until the value fits
///
/// # Examples
///
/// ```rust
/// use garble_core::seed::int_bytes;
///
/// assert_eq!(int_bytes(0), vec![0x00]);
/// assert_eq!(int_bytes(151), vec![0x97]);
/// assert_eq!(int_bytes(-128), vec![0x80]);
/// assert_eq!(int_bytes(-129), vec![0xff, 0x7f]);
/// ```
pub fn int_bytes(value: i128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    if value == 0 {
        return vec![0];
    }
    if value > 0 {
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        return bytes[skip..].to_vec();
    }

    let bit_length = 128 - value.unsigned_abs().leading_zeros() as usize;
    let mut length = bit_length.div_ceil(8).max(1);
    while !fits_twos_complement(value, length) {
        length += 1;
    }
    bytes[bytes.len() - length..].to_vec()
}

fn fits_twos_complement(value: i128, length: usize) -> bool {
    if length >= 16 {
        return true;
    }
    value >= -(1i128 << (8 * length - 1))
}

/// Derives the seed for the operation `name` at position `index`.
///
/// Pure and platform independent. The same name at a different position
/// yields a different seed, so reordering a pipeline changes the seeds its
/// operations receive.
pub fn derive_seed(master: i128, name: &str, index: usize) -> u64 {
    let mut hasher = Blake2s64::new();
    hasher.update(int_bytes(master));
    hasher.update([0u8]);
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.update(int_bytes(index as i128));

    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest);
    u64::from_be_bytes(out)
}
