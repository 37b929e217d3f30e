//! Intra-block bit position generation.
//!
//! Positions come from additive double hashing over the secondary stream.
//! Each step of the sequence is finalized and sliced into position-wide
//! chunks:
//!
//! ```text
//! a0    = mix(h2 ^ SEED_SALT)
//! b0    = mix(h2 ^ STEP_SALT) | 1
//! w_j   = mix(a0 + j × b0)                          one word per chunk group
//! pos_i = bits [w·s, w·s + w) of w_j                w = log2(bits_per_block)
//!                                                   j = i / (64 / w), s = i mod (64 / w)
//! ```
//!
//! A 512-bit block takes 9-bit positions, seven per word; a 256-bit block
//! takes 8-bit positions, eight per word. At the default `k` a key costs two
//! mixes.
//!
//! Positions may repeat, so a key sets between 1 and `k` bits.
//!
//! # Examples
//!
//! ```
//! use splitbloom::core::BlockSize;
//! use splitbloom::hash::strategies::DoubleHashing;
//!
//! let mask = DoubleHashing.mask(0xdead_beef, 8, BlockSize::Bits512);
//! assert!(mask.count_ones() >= 1 && mask.count_ones() <= 8);
//! assert_eq!(mask.lanes(), 8);
//! ```

#![allow(clippy::cast_possible_truncation)]

use crate::core::block::{BlockMask, BlockSize};
use crate::hash::mix::mix64;

/// Salt for the starting offset stream.
pub const SEED_SALT: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// Salt for the step stream.
pub const STEP_SALT: u64 = 0x0123_4567_89AB_CDEF;

/// Additive double hashing confined to one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHashing;

impl DoubleHashing {
    /// Iterate the `k` in-block bit positions for a secondary hash.
    #[inline]
    pub fn positions(self, h2: u64, k: u32, block_size: BlockSize) -> impl Iterator<Item = u32> {
        let a0 = mix64(h2 ^ SEED_SALT);
        let b0 = mix64(h2 ^ STEP_SALT) | 1;
        let width = block_size.position_bits();
        let per_word = 64 / width;
        let modulus = block_size.position_mask();

        let mut word = 0u64;
        (0..k).map(move |i| {
            let slot = i % per_word;
            if slot == 0 {
                let step = u64::from(i / per_word);
                word = mix64(a0.wrapping_add(step.wrapping_mul(b0)));
            }
            ((word >> (slot * width)) & modulus) as u32
        })
    }

    /// Assemble the block-shaped mask for a secondary hash.
    #[inline]
    #[must_use]
    pub fn mask(self, h2: u64, k: u32, block_size: BlockSize) -> BlockMask {
        let mut mask = BlockMask::empty(block_size);
        for pos in self.positions(h2, k, block_size) {
            mask.set_bit(pos);
        }
        mask
    }
}
