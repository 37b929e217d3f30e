//! Cache-line aligned block storage.
//!
//! Storage is a single owned `Vec` of 64-byte aligned lines. Blocks are carved
//! out of the lines by index; a 512-bit block is exactly one line and 256-bit
//! blocks pack two per line, so no block ever straddles a line boundary.
//!
//! The buffer is reserved fallibly and zero-filled on construction, released
//! once when the storage is dropped, and deep-copied by `Clone`.

use crate::core::block::BlockSize;
use crate::error::{Result, SplitBlockError};
use crate::util::bitops::{ceil_div, popcount_words};

/// Bytes in one cache line.
pub const CACHE_LINE_BYTES: usize = 64;

/// `u64` words in one cache line.
pub const WORDS_PER_LINE: usize = CACHE_LINE_BYTES / 8;

/// One 64-byte, 64-byte-aligned line of filter bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct CacheLine {
    words: [u64; WORDS_PER_LINE],
}

/// Owned, zero-initialised array of fixed-width blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStorage {
    lines: Vec<CacheLine>,
    block_count: usize,
    lanes: usize,
}

impl BlockStorage {
    /// Allocate `block_count` zeroed blocks of the given size.
    ///
    /// # Errors
    ///
    /// - [`SplitBlockError::InvalidParameters`] if `block_count` is zero or the
    ///   byte size overflows `usize`
    /// - [`SplitBlockError::AllocationFailed`] if the allocator refuses the request
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::core::{BlockSize, BlockStorage};
    ///
    /// let storage = BlockStorage::zeroed(4, BlockSize::Bits256).unwrap();
    /// assert_eq!(storage.block_count(), 4);
    /// assert_eq!(storage.allocated_bytes(), 128);
    /// assert!(storage.block(3).iter().all(|&w| w == 0));
    /// ```
    pub fn zeroed(block_count: usize, block_size: BlockSize) -> Result<Self> {
        if block_count == 0 {
            return Err(SplitBlockError::invalid_parameters(
                "block storage needs at least one block",
            ));
        }

        let lanes = block_size.lanes();
        let words = block_count.checked_mul(lanes).ok_or_else(|| {
            SplitBlockError::invalid_parameters(format!(
                "{} blocks of {} overflow the address space",
                block_count,
                block_size.name()
            ))
        })?;
        let line_count = ceil_div(words as u64, WORDS_PER_LINE as u64) as usize;
        let bytes = line_count.saturating_mul(CACHE_LINE_BYTES);

        let mut lines = Vec::new();
        lines
            .try_reserve_exact(line_count)
            .map_err(|_| SplitBlockError::allocation_failed(bytes))?;
        lines.resize(line_count, CacheLine::default());

        Ok(Self {
            lines,
            block_count,
            lanes,
        })
    }

    /// Number of blocks.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Lanes per block.
    #[inline]
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Bytes actually held by the backing buffer (whole cache lines).
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.lines.len() * CACHE_LINE_BYTES
    }

    /// Borrow block `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= block_count()`.
    #[inline]
    #[must_use]
    pub fn block(&self, index: usize) -> &[u64] {
        assert!(index < self.block_count, "block {} out of range", index);
        let word = index * self.lanes;
        let offset = word % WORDS_PER_LINE;
        &self.lines[word / WORDS_PER_LINE].words[offset..offset + self.lanes]
    }

    /// Mutably borrow block `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= block_count()`.
    #[inline]
    pub fn block_mut(&mut self, index: usize) -> &mut [u64] {
        assert!(index < self.block_count, "block {} out of range", index);
        let word = index * self.lanes;
        let offset = word % WORDS_PER_LINE;
        &mut self.lines[word / WORDS_PER_LINE].words[offset..offset + self.lanes]
    }

    /// Iterate over all blocks in index order.
    pub fn blocks(&self) -> impl Iterator<Item = &[u64]> + '_ {
        (0..self.block_count).map(move |i| self.block(i))
    }

    /// Zero every block.
    pub fn clear(&mut self) {
        self.lines.fill(CacheLine::default());
    }

    /// Total number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u64 {
        self.lines.iter().map(|line| popcount_words(&line.words)).sum()
    }

    /// Address of the first line, for alignment checks.
    #[must_use]
    pub fn as_ptr(&self) -> *const u64 {
        self.lines.as_ptr().cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_layout() {
        assert_eq!(std::mem::size_of::<CacheLine>(), 64);
        assert_eq!(std::mem::align_of::<CacheLine>(), 64);
    }

    #[test]
    fn test_storage_is_aligned_and_zeroed() {
        for size in [BlockSize::Bits256, BlockSize::Bits512] {
            let storage = BlockStorage::zeroed(16, size).unwrap();
            assert_eq!(storage.as_ptr() as usize % CACHE_LINE_BYTES, 0);
            assert_eq!(storage.count_ones(), 0);
            assert_eq!(storage.blocks().count(), 16);
            assert!(storage.blocks().all(|b| b.len() == size.lanes()));
        }
    }

    #[test]
    fn test_half_line_blocks_do_not_overlap() {
        let mut storage = BlockStorage::zeroed(3, BlockSize::Bits256).unwrap();
        assert_eq!(storage.allocated_bytes(), 128);

        storage.block_mut(0).fill(u64::MAX);
        assert!(storage.block(1).iter().all(|&w| w == 0));
        assert!(storage.block(2).iter().all(|&w| w == 0));

        storage.block_mut(1)[3] = 1;
        assert_eq!(storage.block(1), &[0, 0, 0, 1]);
        assert_eq!(storage.count_ones(), 256 + 1);
    }

    #[test]
    fn test_clear() {
        let mut storage = BlockStorage::zeroed(2, BlockSize::Bits512).unwrap();
        storage.block_mut(1)[7] = 0xFF;
        assert_eq!(storage.count_ones(), 8);

        storage.clear();
        assert_eq!(storage.count_ones(), 0);
        assert_eq!(storage.block_count(), 2);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = BlockStorage::zeroed(2, BlockSize::Bits512).unwrap();
        let copy = original.clone();
        original.block_mut(0)[0] = 1;
        assert_eq!(copy.count_ones(), 0);
        assert_ne!(original.as_ptr(), copy.as_ptr());
    }

    #[test]
    fn test_zero_blocks_rejected() {
        let err = BlockStorage::zeroed(0, BlockSize::Bits512).unwrap_err();
        assert!(matches!(err, SplitBlockError::InvalidParameters { .. }));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_unallocatable_storage_is_an_error() {
        // 2^57 bytes: past any real address space.
        let err = BlockStorage::zeroed(1 << 51, BlockSize::Bits512).unwrap_err();
        assert!(matches!(err, SplitBlockError::AllocationFailed { bytes } if bytes == 1 << 57));

        // Past `isize::MAX`: refused before reaching the allocator.
        let err = BlockStorage::zeroed(1 << 58, BlockSize::Bits512).unwrap_err();
        assert!(matches!(err, SplitBlockError::AllocationFailed { .. }));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_block_panics() {
        let storage = BlockStorage::zeroed(2, BlockSize::Bits512).unwrap();
        let _ = storage.block(2);
    }
}
