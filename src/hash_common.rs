//! Sizing and key-scrambling helpers shared by every table in this crate.

use crate::error::Error;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Expected element count used when none is given.
///
/// Tables whose size is at or below this value are never shrunk by
/// removals.
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// Largest table size (in slots) this crate will ever compute.
pub const MAX_TABLE_SIZE: usize = 1 << (usize::BITS - 2);

/// Golden-ratio multiplier of the mixer. Odd, hence invertible modulo 2^64.
const PHI: u64 = 0x9E37_79B9_7F4A_7C15;

/// Multiplicative inverse of [`PHI`] modulo 2^64.
const INV_PHI: u64 = 0xF1DE_83E1_9937_733D;

/// Validates that `load_factor` lies in the open interval `(0, 1)`.
#[inline]
pub fn check_load_factor(load_factor: f32) -> Result<(), Error> {
    // Written so that NaN is rejected as well.
    if load_factor > 0.0 && load_factor < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidLoadFactor(load_factor))
    }
}

/// Returns the number of live entries a table of `n` slots may hold under
/// `load_factor` before it must grow.
///
/// This is `floor(n * load_factor)`, capped at `n - 1`: at least one slot
/// must stay empty so that every probe sequence terminates.
#[inline]
pub fn max_fill(n: usize, load_factor: f32) -> usize {
    let fill = (n as f64 * load_factor as f64).floor() as usize;
    fill.min(n.saturating_sub(1))
}

/// Returns the smallest power-of-two table size `n` (at least 2) such that
/// `expected <= max_fill(n, load_factor)`.
///
/// # Examples
///
/// ```rust
/// use long_hash::hash_common::array_size;
/// use long_hash::hash_common::max_fill;
///
/// let n = array_size(4, 0.75).unwrap();
/// assert_eq!(n, 8);
/// assert_eq!(max_fill(n, 0.75), 6);
/// assert!(array_size(4, 1.0).is_err());
/// ```
pub fn array_size(expected: usize, load_factor: f32) -> Result<usize, Error> {
    check_load_factor(load_factor)?;

    let wanted = (expected as f64 / load_factor as f64).ceil();
    if wanted > MAX_TABLE_SIZE as f64 {
        return Err(Error::CapacityOverflow { expected });
    }

    let mut n = (wanted as usize).max(2).next_power_of_two();
    // The float estimate can land one power short when n * f rounds down.
    while max_fill(n, load_factor) < expected {
        if n >= MAX_TABLE_SIZE {
            return Err(Error::CapacityOverflow { expected });
        }
        n *= 2;
    }

    Ok(n)
}

/// Scrambles the bits of a key before it is masked down to a home slot.
///
/// A multiply by the golden ratio followed by two xor-shifts. Every step is
/// invertible, so the function is a bijection on `u64` (see [`inv_mix`]) and
/// two distinct keys can only share a home slot through masking.
#[inline(always)]
pub const fn mix(key: u64) -> u64 {
    let h = key.wrapping_mul(PHI);
    let h = h ^ (h >> 32);
    h ^ (h >> 16)
}

/// Inverse of [`mix`]: `inv_mix(mix(k)) == k` for every `k`.
///
/// Useful to build keys that land on a chosen home slot.
///
/// # Examples
///
/// ```rust
/// use long_hash::hash_common::inv_mix;
/// use long_hash::hash_common::mix;
///
/// let key = inv_mix(0x1_0000_0005);
/// assert_eq!(mix(key) & 0xF, 5);
/// assert_eq!(inv_mix(mix(12345)), 12345);
/// ```
#[inline]
pub const fn inv_mix(hash: u64) -> u64 {
    let h = hash ^ (hash >> 16) ^ (hash >> 32) ^ (hash >> 48);
    let h = h ^ (h >> 32);
    h.wrapping_mul(INV_PHI)
}

/// Folds a key into 32 bits by xoring its halves.
#[inline(always)]
pub const fn fold_key(key: u64) -> u32 {
    (key ^ (key >> 32)) as u32
}
