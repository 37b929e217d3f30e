//! Block-wide set/test kernels and runtime backend selection.
//!
//! Every filter operation reduces to one of two lane-wise primitives on a
//! single block and a same-shaped mask:
//!
//! - **set**: `block |= mask`
//! - **test**: `(block & mask) == mask`
//!
//! Three backends implement them with identical observable results:
//!
//! | Backend     | x86-64 | AArch64 | Other  |
//! |-------------|--------|---------|--------|
//! | `Scalar`    | u64    | u64     | u64    |
//! | `Vector128` | SSE2   | NEON    | -      |
//! | `Vector256` | AVX2   | -       | -      |
//!
//! Vector kernels process as many full registers as fit in the block and
//! finish any trailing words with the next narrower kernel, so a 256-bit
//! block on `Vector256` is one register and a 512-bit block is two.
//!
//! # Safety
//!
//! Vector backends are only constructible after runtime feature detection
//! ([`Vector128Ops::new`], [`Vector256Ops::new`]), which is what makes the
//! `unsafe` intrinsics behind the safe [`BlockOps`] methods sound.
//!
//! # Examples
//!
//! ```
//! use splitbloom::simd::{Backend, BlockKernel, BlockOps};
//!
//! let kernel = BlockKernel::resolve(Backend::detect()).unwrap();
//! let mut block = [0u64; 8];
//! let mask = [1, 0, 0, 0, 0, 0, 0, 1 << 63];
//!
//! kernel.set(&mut block, &mask);
//! assert!(kernel.test(&block, &mask));
//! ```

pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86;

#[cfg(target_arch = "aarch64")]
mod neon;

use crate::error::{Result, SplitBlockError};
use std::fmt;
use std::sync::OnceLock;

pub use scalar::ScalarOps;

/// Lane-wise block primitives.
///
/// `block` and `mask` have the same number of `u64` lanes (4 or 8).
/// Implementations must agree bit for bit with [`scalar::set`] and
/// [`scalar::test`].
pub trait BlockOps: Send + Sync {
    /// `block |= mask`.
    fn set(&self, block: &mut [u64], mask: &[u64]);

    /// `true` iff every bit of `mask` is set in `block`.
    fn test(&self, block: &[u64], mask: &[u64]) -> bool;

    /// Instruction set name, e.g. `"avx2"`.
    fn name(&self) -> &'static str;
}

/// Runtime-detected CPU capabilities relevant to block kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    /// SSE2 (x86-64 baseline)
    pub has_sse2: bool,
    /// AVX2 (x86-64 only)
    pub has_avx2: bool,
    /// NEON (AArch64 only, always true there)
    pub has_neon: bool,
}

impl CpuFeatures {
    /// Detect CPU features at runtime.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                has_sse2: is_x86_feature_detected!("sse2"),
                has_avx2: is_x86_feature_detected!("avx2"),
                has_neon: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                has_sse2: false,
                has_avx2: false,
                has_neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {
                has_sse2: false,
                has_avx2: false,
                has_neon: false,
            }
        }
    }

    /// A 128-bit kernel can run.
    #[must_use]
    pub const fn has_vector128(self) -> bool {
        self.has_sse2 || self.has_neon
    }

    /// A 256-bit kernel can run.
    #[must_use]
    pub const fn has_vector256(self) -> bool {
        self.has_avx2
    }
}

/// 128-bit kernel: SSE2 on x86-64, NEON on AArch64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector128Ops {
    _detected: (),
}

impl Vector128Ops {
    /// `Some` iff the CPU has a 128-bit vector unit this crate supports.
    #[must_use]
    pub fn new() -> Option<Self> {
        CpuFeatures::detect()
            .has_vector128()
            .then_some(Self { _detected: () })
    }
}

impl BlockOps for Vector128Ops {
    #[inline]
    fn set(&self, block: &mut [u64], mask: &[u64]) {
        #[cfg(target_arch = "x86_64")]
        {
            x86::set_sse2(block, mask);
        }

        #[cfg(target_arch = "aarch64")]
        {
            neon::set_neon(block, mask);
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            scalar::set(block, mask);
        }
    }

    #[inline]
    fn test(&self, block: &[u64], mask: &[u64]) -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            x86::test_sse2(block, mask)
        }

        #[cfg(target_arch = "aarch64")]
        {
            neon::test_neon(block, mask)
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            scalar::test(block, mask)
        }
    }

    fn name(&self) -> &'static str {
        if cfg!(target_arch = "aarch64") {
            "neon"
        } else {
            "sse2"
        }
    }
}

/// 256-bit kernel: AVX2 on x86-64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector256Ops {
    _detected: (),
}

impl Vector256Ops {
    /// `Some` iff the CPU supports AVX2.
    #[must_use]
    pub fn new() -> Option<Self> {
        CpuFeatures::detect()
            .has_vector256()
            .then_some(Self { _detected: () })
    }
}

impl BlockOps for Vector256Ops {
    #[inline]
    fn set(&self, block: &mut [u64], mask: &[u64]) {
        #[cfg(target_arch = "x86_64")]
        {
            // SAFETY: `Vector256Ops` only exists once AVX2 was detected.
            unsafe { x86::set_avx2(block, mask) }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            scalar::set(block, mask);
        }
    }

    #[inline]
    fn test(&self, block: &[u64], mask: &[u64]) -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            // SAFETY: `Vector256Ops` only exists once AVX2 was detected.
            unsafe { x86::test_avx2(block, mask) }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            scalar::test(block, mask)
        }
    }

    fn name(&self) -> &'static str {
        "avx2"
    }
}

/// Backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Portable 64-bit lanes.
    Scalar,
    /// 128-bit registers (SSE2 / NEON).
    Vector128,
    /// 256-bit registers (AVX2).
    Vector256,
}

impl Backend {
    /// All backends, narrowest first.
    pub const ALL: [Backend; 3] = [Backend::Scalar, Backend::Vector128, Backend::Vector256];

    /// Widest backend the running CPU supports.
    ///
    /// Detection runs once per process.
    #[must_use]
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Backend> = OnceLock::new();

        *DETECTED.get_or_init(|| {
            let features = CpuFeatures::detect();
            let backend = if features.has_vector256() {
                Backend::Vector256
            } else if features.has_vector128() {
                Backend::Vector128
            } else {
                Backend::Scalar
            };
            tracing::debug!(backend = backend.name(), ?features, "selected block backend");
            backend
        })
    }

    /// Backends usable on this CPU, narrowest first. Always contains `Scalar`.
    #[must_use]
    pub fn available() -> Vec<Backend> {
        Self::ALL.into_iter().filter(|b| b.is_supported()).collect()
    }

    /// Whether this backend can run on the current CPU.
    #[must_use]
    pub fn is_supported(self) -> bool {
        let features = CpuFeatures::detect();
        match self {
            Backend::Scalar => true,
            Backend::Vector128 => features.has_vector128(),
            Backend::Vector256 => features.has_vector256(),
        }
    }

    /// Register width in bits.
    #[must_use]
    pub const fn register_bits(self) -> u32 {
        match self {
            Backend::Scalar => 64,
            Backend::Vector128 => 128,
            Backend::Vector256 => 256,
        }
    }

    /// Short lowercase label, as used in logs and bench ids.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Vector128 => "vector128",
            Backend::Vector256 => "vector256",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved, runnable backend.
///
/// Fixed at filter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKernel {
    /// Portable 64-bit words.
    Scalar(ScalarOps),
    /// SSE2 or NEON.
    Vector128(Vector128Ops),
    /// AVX2.
    Vector256(Vector256Ops),
}

impl BlockKernel {
    /// Resolve a backend selector against the running CPU.
    ///
    /// # Errors
    ///
    /// [`SplitBlockError::UnsupportedBackend`] if the CPU lacks the
    /// instruction set.
    pub fn resolve(backend: Backend) -> Result<Self> {
        let kernel = match backend {
            Backend::Scalar => Some(BlockKernel::Scalar(ScalarOps)),
            Backend::Vector128 => Vector128Ops::new().map(BlockKernel::Vector128),
            Backend::Vector256 => Vector256Ops::new().map(BlockKernel::Vector256),
        };
        kernel.ok_or_else(|| SplitBlockError::unsupported_backend(backend.name()))
    }

    /// Kernel for [`Backend::detect`], falling back to scalar.
    #[must_use]
    pub fn detect() -> Self {
        Self::resolve(Backend::detect()).unwrap_or(BlockKernel::Scalar(ScalarOps))
    }

    /// The selector this kernel was resolved from.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            BlockKernel::Scalar(_) => Backend::Scalar,
            BlockKernel::Vector128(_) => Backend::Vector128,
            BlockKernel::Vector256(_) => Backend::Vector256,
        }
    }
}

impl Default for BlockKernel {
    fn default() -> Self {
        Self::detect()
    }
}

impl BlockOps for BlockKernel {
    #[inline(always)]
    fn set(&self, block: &mut [u64], mask: &[u64]) {
        debug_assert_eq!(block.len(), mask.len());
        match self {
            BlockKernel::Scalar(ops) => ops.set(block, mask),
            BlockKernel::Vector128(ops) => ops.set(block, mask),
            BlockKernel::Vector256(ops) => ops.set(block, mask),
        }
    }

    #[inline(always)]
    fn test(&self, block: &[u64], mask: &[u64]) -> bool {
        debug_assert_eq!(block.len(), mask.len());
        match self {
            BlockKernel::Scalar(ops) => ops.test(block, mask),
            BlockKernel::Vector128(ops) => ops.test(block, mask),
            BlockKernel::Vector256(ops) => ops.test(block, mask),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BlockKernel::Scalar(ops) => ops.name(),
            BlockKernel::Vector128(ops) => ops.name(),
            BlockKernel::Vector256(ops) => ops.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn kernels() -> Vec<BlockKernel> {
        Backend::available()
            .into_iter()
            .map(|b| BlockKernel::resolve(b).unwrap())
            .collect()
    }

    #[test]
    fn test_scalar_always_available() {
        let available = Backend::available();
        assert_eq!(available[0], Backend::Scalar);
        assert!(Backend::Scalar.is_supported());
        assert!(available.contains(&Backend::detect()));
    }

    #[test]
    fn test_detect_is_stable() {
        assert_eq!(Backend::detect(), Backend::detect());
        assert_eq!(BlockKernel::detect().backend(), Backend::detect());
    }

    #[test]
    fn test_resolve_unsupported_reports_backend() {
        for backend in Backend::ALL {
            match BlockKernel::resolve(backend) {
                Ok(kernel) => assert_eq!(kernel.backend(), backend),
                Err(e) => {
                    assert!(!backend.is_supported());
                    assert_eq!(e, SplitBlockError::unsupported_backend(backend.name()));
                }
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_vector128_always_on_x86_64() {
        assert!(Backend::Vector128.is_supported());
        assert_eq!(BlockKernel::resolve(Backend::Vector128).unwrap().name(), "sse2");
    }

    #[test]
    fn test_backends_agree_on_random_blocks() {
        let mut rng = StdRng::seed_from_u64(0x5b1f);
        for lanes in [4usize, 8] {
            for _ in 0..500 {
                let block: Vec<u64> = (0..lanes).map(|_| rng.gen::<u64>() & rng.gen::<u64>()).collect();
                let mask: Vec<u64> = (0..lanes)
                    .map(|_| if rng.gen_bool(0.5) { 0 } else { 1u64 << rng.gen_range(0..64) })
                    .collect();

                let expected_test = scalar::test(&block, &mask);
                let mut expected_set = block.clone();
                scalar::set(&mut expected_set, &mask);

                for kernel in kernels() {
                    assert_eq!(kernel.test(&block, &mask), expected_test, "{}", kernel.name());
                    let mut got = block.clone();
                    kernel.set(&mut got, &mask);
                    assert_eq!(got, expected_set, "{}", kernel.name());
                    assert!(kernel.test(&got, &mask), "{}", kernel.name());
                }
            }
        }
    }

    #[test]
    fn test_single_missing_bit_detected_in_every_lane() {
        for kernel in kernels() {
            for lanes in [4usize, 8] {
                for word in 0..lanes {
                    for bit in [0u32, 31, 63] {
                        let mut mask = vec![0u64; lanes];
                        mask[word] = 1 << bit;
                        let mut block = vec![u64::MAX; lanes];
                        block[word] &= !(1 << bit);
                        assert!(!kernel.test(&block, &mask), "{} lane {} bit {}", kernel.name(), word, bit);
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_mask_always_present() {
        for kernel in kernels() {
            assert!(kernel.test(&[0u64; 8], &[0u64; 8]));
            assert!(kernel.test(&[0u64; 4], &[0u64; 4]));
        }
    }
}
