//! Block selection by masking the primary hash.
//!
//! Block counts are powers of two for the lifetime of a filter, so the block
//! index is `h1 & (block_count - 1)`: one AND, uniform whenever `h1` is.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{Result, SplitBlockError};
use crate::util::bitops::is_power_of_two;

/// Maps a primary hash to a block index in `[0, block_count)`.
///
/// # Examples
///
/// ```
/// use splitbloom::core::BlockAddresser;
///
/// let addr = BlockAddresser::new(8).unwrap();
/// assert_eq!(addr.index(13), 5);
/// assert!(BlockAddresser::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAddresser {
    mask: u64,
}

impl BlockAddresser {
    /// Addresser for `block_count` blocks.
    ///
    /// # Errors
    ///
    /// [`SplitBlockError::InvalidParameters`] unless `block_count` is a
    /// non-zero power of two.
    pub fn new(block_count: u64) -> Result<Self> {
        if !is_power_of_two(block_count) {
            return Err(SplitBlockError::invalid_parameters(format!(
                "block count {} is not a power of two",
                block_count
            )));
        }
        Ok(Self {
            mask: block_count - 1,
        })
    }

    /// Block index for a primary hash.
    #[inline(always)]
    #[must_use]
    pub const fn index(&self, h1: u64) -> usize {
        (h1 & self.mask) as usize
    }

    /// Number of addressable blocks.
    #[must_use]
    pub const fn block_count(&self) -> u64 {
        self.mask + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::mix::KeyHashes;

    #[test]
    fn test_single_block() {
        let addr = BlockAddresser::new(1).unwrap();
        assert_eq!(addr.index(u64::MAX), 0);
        assert_eq!(addr.block_count(), 1);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        for bad in [0, 3, 6, 1000] {
            assert!(BlockAddresser::new(bad).is_err());
        }
    }

    #[test]
    fn test_index_in_range_and_uniform() {
        let addr = BlockAddresser::new(64).unwrap();
        let mut counts = [0u32; 64];
        for key in 0..64_000u64 {
            let idx = addr.index(KeyHashes::derive(key).h1);
            assert!(idx < 64);
            counts[idx] += 1;
        }
        // Expected 1000 per block; allow ±15% (≈ 5 sigma).
        assert!(counts.iter().all(|&c| (850..=1150).contains(&c)), "{:?}", counts);
    }
}
