//! Portable lane-wise block operations.
//!
//! Reference semantics for every backend: vector implementations must match
//! these bit for bit.

use super::BlockOps;

/// `block |= mask`, lane by lane.
#[inline]
pub fn set(block: &mut [u64], mask: &[u64]) {
    for (b, m) in block.iter_mut().zip(mask) {
        *b |= *m;
    }
}

/// `(block & mask) == mask`, folded over all lanes without early exit.
#[inline]
#[must_use]
pub fn test(block: &[u64], mask: &[u64]) -> bool {
    block
        .iter()
        .zip(mask)
        .fold(0u64, |missing, (b, m)| missing | ((b & m) ^ m))
        == 0
}

/// Scalar backend, available everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarOps;

impl BlockOps for ScalarOps {
    #[inline]
    fn set(&self, block: &mut [u64], mask: &[u64]) {
        set(block, mask);
    }

    #[inline]
    fn test(&self, block: &[u64], mask: &[u64]) -> bool {
        test(block, mask)
    }

    fn name(&self) -> &'static str {
        "scalar"
    }
}
