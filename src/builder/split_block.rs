//! Builder for split-block Bloom filters.
//!
//! # Type-State Pattern
//!
//! ```text
//! SplitBlockFilterBuilder<Initial>
//!     .expected_keys(n)            → <WithKeys>
//!     .false_positive_rate(p)      → <Complete>
//!   | .bits_per_key(bits, k)       → <Complete>
//!     .build()                     → Result<SplitBlockBloomFilter<H>>
//! ```
//!
//! `block_size`, `backend` and `hasher` are optional and may be set in any
//! state.
//!
//! # Examples
//!
//! ```
//! use splitbloom::builder::SplitBlockFilterBuilder;
//! use splitbloom::core::BlockSize;
//! use splitbloom::simd::Backend;
//!
//! let filter = SplitBlockFilterBuilder::new()
//!     .expected_keys(10_000)
//!     .false_positive_rate(0.001)
//!     .block_size(BlockSize::Bits256)
//!     .backend(Backend::Scalar)
//!     .build()?;
//!
//! assert_eq!(filter.block_count(), 1024);
//! assert_eq!(filter.backend(), Backend::Scalar);
//! # Ok::<(), splitbloom::SplitBlockError>(())
//! ```
//!
//! Invalid values are caught when building:
//!
//! ```
//! use splitbloom::builder::SplitBlockFilterBuilder;
//!
//! let result = SplitBlockFilterBuilder::new()
//!     .expected_keys(10_000)
//!     .bits_per_key(10.0, 40)
//!     .build();
//! assert!(result.is_err());
//! ```

use crate::core::params::{self, FilterPlan, Sizing};
use crate::core::BlockSize;
use crate::error::{Result, SplitBlockError};
use crate::filters::SplitBlockBloomFilter;
use crate::hash::{Fnv1aHasher, KeyHasher};
use crate::simd::{Backend, BlockKernel};
use std::marker::PhantomData;

/// Type-state marker: nothing set.
#[derive(Debug, Clone, Copy)]
pub struct Initial;

/// Type-state marker: expected key count set.
#[derive(Debug, Clone, Copy)]
pub struct WithKeys;

/// Type-state marker: sizing set, ready to build.
#[derive(Debug, Clone, Copy)]
pub struct Complete;

/// Type-state builder for [`SplitBlockBloomFilter`].
///
/// # Type Parameters
///
/// - `State`: Current builder state (`Initial`, `WithKeys`, `Complete`)
/// - `H`: Key hasher (defaults to [`Fnv1aHasher`])
#[derive(Debug, Clone)]
pub struct SplitBlockFilterBuilder<State, H = Fnv1aHasher> {
    expected_keys: u64,
    sizing: Option<Sizing>,
    block_size: BlockSize,
    backend: Option<Backend>,
    hasher: H,
    _state: PhantomData<State>,
}

impl SplitBlockFilterBuilder<Initial, Fnv1aHasher> {
    /// Start a builder with 512-bit blocks, FNV-1a and the detected backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expected_keys: 0,
            sizing: None,
            block_size: BlockSize::default(),
            backend: None,
            hasher: Fnv1aHasher,
            _state: PhantomData,
        }
    }
}

impl Default for SplitBlockFilterBuilder<Initial, Fnv1aHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, H> SplitBlockFilterBuilder<S, H> {
    fn transition<T>(self) -> SplitBlockFilterBuilder<T, H> {
        SplitBlockFilterBuilder {
            expected_keys: self.expected_keys,
            sizing: self.sizing,
            block_size: self.block_size,
            backend: self.backend,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }

    /// Block width (default: 512 bits, one cache line).
    #[must_use]
    pub fn block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Force a backend instead of detecting the widest one.
    ///
    /// Building fails with [`SplitBlockError::UnsupportedBackend`] if the
    /// CPU cannot run it.
    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Key hasher for the `*_key` / `*_item` conveniences.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::builder::SplitBlockFilterBuilder;
    /// use splitbloom::hash::{Fnv1aHasher, KeyHasher};
    ///
    /// let filter = SplitBlockFilterBuilder::new()
    ///     .hasher(Fnv1aHasher::new())
    ///     .expected_keys(100)
    ///     .false_positive_rate(0.01)
    ///     .build()?;
    /// assert_eq!(filter.hasher().name(), "FNV-1a");
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    #[must_use]
    pub fn hasher<H2: KeyHasher>(self, hasher: H2) -> SplitBlockFilterBuilder<S, H2> {
        SplitBlockFilterBuilder {
            expected_keys: self.expected_keys,
            sizing: self.sizing,
            block_size: self.block_size,
            backend: self.backend,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H> SplitBlockFilterBuilder<Initial, H> {
    /// Number of distinct keys the filter should hold at its target rate.
    /// `0` is treated as 1.
    #[must_use]
    pub fn expected_keys(mut self, keys: u64) -> SplitBlockFilterBuilder<WithKeys, H> {
        self.expected_keys = keys;
        self.transition()
    }
}

impl<H> SplitBlockFilterBuilder<WithKeys, H> {
    /// Size for a target false positive probability in (0, 1).
    #[must_use]
    pub fn false_positive_rate(mut self, fp_rate: f64) -> SplitBlockFilterBuilder<Complete, H> {
        self.sizing = Some(Sizing::FalsePositiveRate(fp_rate));
        self.transition()
    }

    /// Size from a memory budget: `bits_per_key` bits of storage per key,
    /// `hashes_per_key` bits set per key (1 to 32).
    #[must_use]
    pub fn bits_per_key(mut self, bits_per_key: f64, hashes_per_key: u32) -> SplitBlockFilterBuilder<Complete, H> {
        self.sizing = Some(Sizing::BitsPerKey {
            bits_per_key,
            hashes_per_key,
        });
        self.transition()
    }
}

impl<H: KeyHasher> SplitBlockFilterBuilder<Complete, H> {
    fn parts(&self) -> Result<(Sizing, BlockKernel)> {
        let sizing = self
            .sizing
            .ok_or_else(|| SplitBlockError::invalid_parameters("sizing was not configured"))?;
        sizing.validate()?;

        let kernel = match self.backend {
            Some(backend) => BlockKernel::resolve(backend)?,
            None => BlockKernel::detect(),
        };
        Ok((sizing, kernel))
    }

    /// Geometry the filter would get, without allocating it.
    ///
    /// # Errors
    ///
    /// Same validation as [`build`](Self::build), except backend support.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::builder::SplitBlockFilterBuilder;
    ///
    /// let plan = SplitBlockFilterBuilder::new()
    ///     .expected_keys(10_000)
    ///     .false_positive_rate(0.001)
    ///     .plan()?;
    /// assert_eq!(plan.block_count, 512);
    /// assert_eq!(plan.size_bytes(), 32 * 1024);
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    pub fn plan(&self) -> Result<FilterPlan> {
        let sizing = self
            .sizing
            .ok_or_else(|| SplitBlockError::invalid_parameters("sizing was not configured"))?;
        params::plan(self.expected_keys, sizing, self.block_size)
    }

    /// Validate everything and allocate the filter.
    ///
    /// # Errors
    ///
    /// - [`SplitBlockError::FalsePositiveRateOutOfBounds`], [`SplitBlockError::InvalidBitsPerKey`],
    ///   [`SplitBlockError::InvalidHashCount`] for bad sizing
    /// - [`SplitBlockError::UnsupportedBackend`] for a forced backend the CPU lacks
    /// - [`SplitBlockError::AllocationFailed`] if storage cannot be allocated
    pub fn build(self) -> Result<SplitBlockBloomFilter<H>> {
        let (sizing, kernel) = self.parts()?;
        SplitBlockBloomFilter::from_parts(self.expected_keys, sizing, self.block_size, kernel, self.hasher)
    }

    /// [`build`](Self::build), also returning the resolved geometry.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_plan(self) -> Result<(SplitBlockBloomFilter<H>, FilterPlan)> {
        let filter = self.build()?;
        let plan = filter.plan();
        Ok((filter, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let filter = SplitBlockFilterBuilder::new()
            .expected_keys(10_000)
            .false_positive_rate(0.01)
            .build()
            .unwrap();

        assert!(filter.is_empty());
        assert_eq!(filter.block_size(), BlockSize::Bits512);
        assert_eq!(filter.backend(), Backend::detect());
    }

    #[test]
    fn test_builder_matches_direct_constructor() {
        let built = SplitBlockFilterBuilder::new()
            .expected_keys(10_000)
            .false_positive_rate(0.001)
            .build()
            .unwrap();
        let direct = SplitBlockBloomFilter::new(10_000, 0.001).unwrap();
        assert_eq!(built.plan(), direct.plan());
    }

    #[test]
    fn test_builder_bits_per_key() {
        let (filter, plan) = SplitBlockFilterBuilder::new()
            .expected_keys(1_000)
            .bits_per_key(16.0, 12)
            .block_size(BlockSize::Bits256)
            .build_with_plan()
            .unwrap();

        // 16,000 bits -> 63 blocks -> 64 blocks of 256 bits.
        assert_eq!(plan.block_count, 64);
        assert_eq!(plan.hashes_per_key, 12);
        assert_eq!(filter.bits_per_block(), 256);
        assert_eq!(filter.plan(), plan);
    }

    #[test]
    fn test_builder_every_available_backend() {
        for backend in Backend::available() {
            let filter = SplitBlockFilterBuilder::new()
                .expected_keys(100)
                .false_positive_rate(0.01)
                .backend(backend)
                .build()
                .unwrap();
            assert_eq!(filter.backend(), backend);
        }
    }

    #[test]
    fn test_builder_unsupported_backend() {
        for backend in Backend::ALL.into_iter().filter(|b| !b.is_supported()) {
            let result = SplitBlockFilterBuilder::new()
                .expected_keys(100)
                .false_positive_rate(0.01)
                .backend(backend)
                .build();
            assert!(matches!(result, Err(SplitBlockError::UnsupportedBackend { .. })));
        }
    }

    #[test]
    fn test_builder_invalid_sizing() {
        for fp_rate in [0.0, 1.0, -0.1, f64::NAN] {
            let result = SplitBlockFilterBuilder::new()
                .expected_keys(100)
                .false_positive_rate(fp_rate)
                .build();
            assert!(matches!(result, Err(SplitBlockError::FalsePositiveRateOutOfBounds { .. })));
        }

        let result = SplitBlockFilterBuilder::new()
            .expected_keys(100)
            .bits_per_key(0.0, 4)
            .build();
        assert!(matches!(result, Err(SplitBlockError::InvalidBitsPerKey { .. })));
    }

    #[test]
    fn test_plan_without_allocation() {
        let builder = SplitBlockFilterBuilder::new()
            .expected_keys(10_000)
            .false_positive_rate(0.001)
            .block_size(BlockSize::Bits256);
        let plan = builder.plan().unwrap();
        assert_eq!(plan.block_count, 1024);
        assert_eq!(builder.build().unwrap().plan(), plan);
    }
}
