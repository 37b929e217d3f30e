//! SplitMix64 finalizer and key-hash stream derivation.
//!
//! Callers supply one 64-bit hash per key. The mixer spreads it into two
//! decorrelated streams: `h1` picks the block and `h2` seeds the bit
//! positions inside that block.
//!
//! # Examples
//!
//! ```
//! use splitbloom::hash::mix::{mix64, KeyHashes};
//!
//! let hashes = KeyHashes::derive(42);
//! assert_eq!(hashes.h1, mix64(42));
//! assert_eq!(hashes.h2, mix64(hashes.h1) | 1);
//! assert_eq!(hashes.h2 & 1, 1);
//! ```

/// Golden-ratio increment used by SplitMix64.
pub const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

const MIX_MUL_1: u64 = 0xbf58_476d_1ce4_e5b9;
const MIX_MUL_2: u64 = 0x94d0_49bb_1331_11eb;

/// SplitMix64 finalizer: full avalanche 64 → 64 bit mixing.
///
/// Every output bit depends on every input bit; flipping one input bit flips
/// roughly half the output bits.
///
/// # Examples
///
/// ```
/// use splitbloom::hash::mix::mix64;
///
/// assert_eq!(mix64(0), 0xe220_a839_7b1d_cdaf);
/// assert_ne!(mix64(1), mix64(2));
/// ```
#[inline(always)]
#[must_use]
pub const fn mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(MIX_MUL_1);
    z = (z ^ (z >> 27)).wrapping_mul(MIX_MUL_2);
    z ^ (z >> 31)
}

/// The two hash streams derived from one key hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHashes {
    /// Primary stream, used for block selection.
    pub h1: u64,
    /// Secondary stream, always odd, used for in-block positions.
    pub h2: u64,
}

impl KeyHashes {
    /// Derive `h1 = mix(h)` and `h2 = mix(h1) | 1`.
    #[inline(always)]
    #[must_use]
    pub const fn derive(key_hash: u64) -> Self {
        let h1 = mix64(key_hash);
        let h2 = mix64(h1) | 1;
        Self { h1, h2 }
    }
}
