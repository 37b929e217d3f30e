//! Block geometry and block-shaped masks.
//!
//! A block is the unit of every insert and query: a fixed run of `u64` lanes
//! sized to one SIMD register (256 bits) or one cache line (512 bits). Every
//! key touches exactly one block, so a query costs at most one cache miss.
//!
//! ```text
//! Bits512:  | w0 | w1 | w2 | w3 | w4 | w5 | w6 | w7 |   one 64-byte line
//! Bits256:  | w0 | w1 | w2 | w3 |                        two blocks per line
//! ```

#![allow(clippy::cast_possible_truncation)]

/// Width of a filter block, fixed for the lifetime of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockSize {
    /// 256-bit blocks (4 × u64), one AVX2 register.
    Bits256,
    /// 512-bit blocks (8 × u64), one cache line.
    #[default]
    Bits512,
}

impl BlockSize {
    /// Maximum lane count of any block size.
    pub const MAX_LANES: usize = 8;

    /// Bits per block.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits256 => 256,
            Self::Bits512 => 512,
        }
    }

    /// Number of `u64` lanes per block.
    #[inline]
    #[must_use]
    pub const fn lanes(self) -> usize {
        self.bits() as usize / 64
    }

    /// Bytes per block.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Width of an in-block bit position: `log2(bits())`.
    #[inline]
    #[must_use]
    pub const fn position_bits(self) -> u32 {
        self.bits().trailing_zeros()
    }

    /// Mask that reduces a value modulo `bits()` (bits is a power of two).
    #[inline]
    #[must_use]
    pub const fn position_mask(self) -> u64 {
        self.bits() as u64 - 1
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bits256 => "256-bit",
            Self::Bits512 => "512-bit",
        }
    }
}

/// A bit pattern shaped exactly like one block.
///
/// Built once per operation and then applied to the target block in a single
/// bulk OR (insert) or AND/compare (query).
///
/// # Examples
///
/// ```
/// use splitbloom::core::{BlockMask, BlockSize};
///
/// let mut mask = BlockMask::empty(BlockSize::Bits256);
/// mask.set_bit(0);
/// mask.set_bit(255);
/// assert_eq!(mask.as_slice(), &[1, 0, 0, 1 << 63]);
/// assert_eq!(mask.count_ones(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMask {
    words: [u64; BlockSize::MAX_LANES],
    lanes: usize,
}

impl BlockMask {
    /// All-zero mask for the given block size.
    #[inline]
    #[must_use]
    pub const fn empty(block_size: BlockSize) -> Self {
        Self {
            words: [0; BlockSize::MAX_LANES],
            lanes: block_size.lanes(),
        }
    }

    /// Build a mask from raw lane words.
    ///
    /// Returns `None` unless `words` has exactly one entry per lane.
    #[must_use]
    pub fn from_words(block_size: BlockSize, words: &[u64]) -> Option<Self> {
        if words.len() != block_size.lanes() {
            return None;
        }
        let mut mask = Self::empty(block_size);
        mask.words[..words.len()].copy_from_slice(words);
        Some(mask)
    }

    /// Set bit `pos` (0-based across the whole block).
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `pos` is outside the block.
    #[inline]
    pub fn set_bit(&mut self, pos: u32) {
        debug_assert!((pos as usize) < self.lanes * 64, "bit {} outside block", pos);
        self.words[(pos >> 6) as usize] |= 1u64 << (pos & 63);
    }

    /// Whether bit `pos` is set.
    #[inline]
    #[must_use]
    pub fn get_bit(&self, pos: u32) -> bool {
        (pos as usize) < self.lanes * 64 && self.words[(pos >> 6) as usize] & (1u64 << (pos & 63)) != 0
    }

    /// The mask lanes, one `u64` per block lane.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.words[..self.lanes]
    }

    /// Lane count of this mask.
    #[inline]
    #[must_use]
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.as_slice().iter().map(|w| w.count_ones()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_geometry() {
        assert_eq!(BlockSize::Bits256.lanes(), 4);
        assert_eq!(BlockSize::Bits512.lanes(), 8);
        assert_eq!(BlockSize::Bits256.bytes(), 32);
        assert_eq!(BlockSize::Bits512.bytes(), 64);
        assert_eq!(BlockSize::Bits512.position_mask(), 511);
        assert_eq!(BlockSize::default(), BlockSize::Bits512);
    }

    #[test]
    fn test_mask_bits() {
        let mut mask = BlockMask::empty(BlockSize::Bits512);
        assert_eq!(mask.count_ones(), 0);

        mask.set_bit(64);
        mask.set_bit(64);
        mask.set_bit(511);

        assert!(mask.get_bit(64));
        assert!(mask.get_bit(511));
        assert!(!mask.get_bit(0));
        assert!(!mask.get_bit(512));
        assert_eq!(mask.count_ones(), 2);
        assert_eq!(mask.as_slice()[1], 1);
        assert_eq!(mask.as_slice()[7], 1 << 63);
    }

    #[test]
    fn test_mask_from_words() {
        let mask = BlockMask::from_words(BlockSize::Bits256, &[1, 2, 3, 4]).unwrap();
        assert_eq!(mask.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(mask.lanes(), 4);

        assert!(BlockMask::from_words(BlockSize::Bits256, &[1, 2]).is_none());
        assert!(BlockMask::from_words(BlockSize::Bits512, &[0; 4]).is_none());
    }
}
