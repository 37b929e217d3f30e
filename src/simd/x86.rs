//! SSE2 (128-bit) and AVX2 (256-bit) block kernels for x86-64.
//!
//! All loads and stores are unaligned so the kernels accept any slice; on
//! filter storage they are always aligned in practice. Trailing words that do
//! not fill a register fall through to the next narrower kernel.

use super::scalar;
use std::arch::x86_64::{
    __m128i, __m256i, _mm256_and_si256, _mm256_loadu_si256, _mm256_or_si256,
    _mm256_setzero_si256, _mm256_storeu_si256, _mm256_testz_si256, _mm256_xor_si256,
    _mm_and_si128, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_or_si128,
    _mm_setzero_si128, _mm_storeu_si128, _mm_xor_si128,
};

const SSE2_WORDS: usize = 2;
const AVX2_WORDS: usize = 4;

#[inline]
pub(super) fn set_sse2(block: &mut [u64], mask: &[u64]) {
    let mut blocks = block.chunks_exact_mut(SSE2_WORDS);
    let mut masks = mask.chunks_exact(SSE2_WORDS);

    for (b, m) in (&mut blocks).zip(&mut masks) {
        // SAFETY: SSE2 is part of the x86-64 baseline. Each chunk is exactly
        // 16 bytes and the loads/stores are unaligned.
        unsafe {
            let vb = _mm_loadu_si128(b.as_ptr().cast::<__m128i>());
            let vm = _mm_loadu_si128(m.as_ptr().cast::<__m128i>());
            _mm_storeu_si128(b.as_mut_ptr().cast::<__m128i>(), _mm_or_si128(vb, vm));
        }
    }

    scalar::set(blocks.into_remainder(), masks.remainder());
}

#[inline]
pub(super) fn test_sse2(block: &[u64], mask: &[u64]) -> bool {
    let mut blocks = block.chunks_exact(SSE2_WORDS);
    let mut masks = mask.chunks_exact(SSE2_WORDS);

    // SAFETY: as in `set_sse2`; reads only.
    let all_present = unsafe {
        let mut missing = _mm_setzero_si128();
        for (b, m) in (&mut blocks).zip(&mut masks) {
            let vb = _mm_loadu_si128(b.as_ptr().cast::<__m128i>());
            let vm = _mm_loadu_si128(m.as_ptr().cast::<__m128i>());
            missing = _mm_or_si128(missing, _mm_xor_si128(_mm_and_si128(vb, vm), vm));
        }
        _mm_movemask_epi8(_mm_cmpeq_epi8(missing, _mm_setzero_si128())) == 0xFFFF
    };

    all_present && scalar::test(blocks.remainder(), masks.remainder())
}

/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn set_avx2(block: &mut [u64], mask: &[u64]) {
    let mut blocks = block.chunks_exact_mut(AVX2_WORDS);
    let mut masks = mask.chunks_exact(AVX2_WORDS);

    for (b, m) in (&mut blocks).zip(&mut masks) {
        let vb = _mm256_loadu_si256(b.as_ptr().cast::<__m256i>());
        let vm = _mm256_loadu_si256(m.as_ptr().cast::<__m256i>());
        _mm256_storeu_si256(b.as_mut_ptr().cast::<__m256i>(), _mm256_or_si256(vb, vm));
    }

    set_sse2(blocks.into_remainder(), masks.remainder());
}

/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn test_avx2(block: &[u64], mask: &[u64]) -> bool {
    let mut blocks = block.chunks_exact(AVX2_WORDS);
    let mut masks = mask.chunks_exact(AVX2_WORDS);

    let mut missing = _mm256_setzero_si256();
    for (b, m) in (&mut blocks).zip(&mut masks) {
        let vb = _mm256_loadu_si256(b.as_ptr().cast::<__m256i>());
        let vm = _mm256_loadu_si256(m.as_ptr().cast::<__m256i>());
        missing = _mm256_or_si256(missing, _mm256_xor_si256(_mm256_and_si256(vb, vm), vm));
    }

    _mm256_testz_si256(missing, missing) == 1 && test_sse2(blocks.remainder(), masks.remainder())
}
