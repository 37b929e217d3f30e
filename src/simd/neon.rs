//! NEON (128-bit) block kernels for AArch64.

use super::scalar;
use std::arch::aarch64::{
    vandq_u64, vdupq_n_u64, veorq_u64, vld1q_u64, vmaxvq_u32, vorrq_u64, vreinterpretq_u32_u64,
    vst1q_u64,
};

const NEON_WORDS: usize = 2;

#[inline]
pub(super) fn set_neon(block: &mut [u64], mask: &[u64]) {
    let mut blocks = block.chunks_exact_mut(NEON_WORDS);
    let mut masks = mask.chunks_exact(NEON_WORDS);

    for (b, m) in (&mut blocks).zip(&mut masks) {
        // SAFETY: NEON is mandatory on AArch64. Each chunk is exactly two
        // u64 words, matching one q-register load/store.
        unsafe {
            let vb = vld1q_u64(b.as_ptr());
            let vm = vld1q_u64(m.as_ptr());
            vst1q_u64(b.as_mut_ptr(), vorrq_u64(vb, vm));
        }
    }

    scalar::set(blocks.into_remainder(), masks.remainder());
}

#[inline]
pub(super) fn test_neon(block: &[u64], mask: &[u64]) -> bool {
    let mut blocks = block.chunks_exact(NEON_WORDS);
    let mut masks = mask.chunks_exact(NEON_WORDS);

    // SAFETY: as in `set_neon`; reads only.
    let all_present = unsafe {
        let mut missing = vdupq_n_u64(0);
        for (b, m) in (&mut blocks).zip(&mut masks) {
            let vb = vld1q_u64(b.as_ptr());
            let vm = vld1q_u64(m.as_ptr());
            missing = vorrq_u64(missing, veorq_u64(vandq_u64(vb, vm), vm));
        }
        vmaxvq_u32(vreinterpretq_u32_u64(missing)) == 0
    };

    all_present && scalar::test(blocks.remainder(), masks.remainder())
}
