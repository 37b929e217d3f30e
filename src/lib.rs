//! splitbloom: cache-line split-block Bloom filters for Rust.
//!
//! A split-block Bloom filter cuts its bit array into fixed-width blocks (one
//! cache line or one SIMD register) and confines every key to a single block.
//! Insert and query cost one cache-line access and one whole-block vector
//! operation, independent of how many bits each key sets.
//!
//! It answers:
//! - **"definitely absent"**: always correct
//! - **"possibly present"**: wrong with a bounded false positive probability
//!
//! # Quick Start
//!
//! ```
//! use splitbloom::SplitBlockBloomFilter;
//!
//! // 10,000 keys at 0.1% false positives
//! let mut filter = SplitBlockBloomFilter::new(10_000, 0.001)?;
//!
//! filter.insert_key(b"hello");
//! filter.insert_key(b"god");
//! filter.insert_key(b"gg");
//!
//! assert!(filter.contains_key(b"hello"));
//! assert!(filter.contains_key(b"god"));
//! # Ok::<(), splitbloom::SplitBlockError>(())
//! ```
//!
//! # Keys and Hashes
//!
//! The core contract is a 64-bit key hash: [`SplitBlockBloomFilter::insert`]
//! and [`SplitBlockBloomFilter::contains`] take a `u64` produced by any
//! well-distributed hash. The `*_key` (raw bytes) and `*_item` (`Hash`
//! values) conveniences run the filter's [`KeyHasher`](hash::KeyHasher)
//! first: FNV-1a by default, XXH3 with the `xxhash` feature.
//!
//! # Geometry
//!
//! | Block size | Lanes     | Per cache line | Register fit       |
//! |------------|-----------|----------------|--------------------|
//! | 256 bits   | 4 × u64   | 2 blocks       | one AVX2 register  |
//! | 512 bits   | 8 × u64   | 1 block        | two AVX2 registers |
//!
//! Block counts are always powers of two; the block index is a mask of the
//! mixed hash.
//!
//! # Backends
//!
//! Block set/test run on the widest backend the CPU supports, detected once
//! at runtime: AVX2, then SSE2 or NEON, then portable scalar code. All
//! backends produce identical bits; see [`simd`].
//!
//! # Concurrency
//!
//! The filter is lock-free and synchronous. Concurrent `contains` through
//! `&self` is safe; writes need `&mut self`, or the
//! [`LockedSplitBlockFilter`] wrapper for `&self` access behind a
//! `parking_lot` reader-writer lock.
//!
//! ```
//! use splitbloom::prelude::*;
//! use std::sync::Arc;
//!
//! let filter = Arc::new(LockedSplitBlockFilter::new(1000, 0.01)?);
//! let f = Arc::clone(&filter);
//! std::thread::spawn(move || f.insert(7)).join().unwrap();
//! assert!(filter.contains(7));
//! # Ok::<(), splitbloom::SplitBlockError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `trace`: per-operation `tracing::trace!` events
//! - `rayon`: parallel batch queries
//! - `xxhash`: [`XxHasher`](hash::XxHasher) key hasher
//!
//! # Non-Features
//!
//! No removal (use a counting filter), no serialization, no merging, no
//! resizing: size for the expected key count up front.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::len_without_is_empty)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Core data structures, traits and sizing math
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Key hashers, hash mixing and in-block positions
pub mod hash;

/// Block set/test kernels and backend selection
///
/// Contains `unsafe` SIMD intrinsics. They are reachable only through
/// kernel values constructed after runtime CPU feature detection.
#[allow(unsafe_code)]
pub mod simd;

/// Type-safe builders
pub mod builder;

/// Thread-safe wrappers
pub mod sync;

/// Bit utilities
pub mod util;

pub use error::{Result, SplitBlockError};

pub use crate::core::filter::{BloomFilter, SharedBloomFilter};
pub use crate::core::{BlockSize, FilterPlan, Sizing};

pub use filters::SplitBlockBloomFilter;

pub use builder::SplitBlockFilterBuilder;

pub use sync::LockedSplitBlockFilter;

pub use simd::Backend;

pub use hash::{Fnv1aHasher, KeyHasher};

#[cfg(feature = "xxhash")]
pub use hash::XxHasher;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use splitbloom::prelude::*;
///
/// let mut filter = SplitBlockFilterBuilder::new()
///     .expected_keys(1000)
///     .false_positive_rate(0.01)
///     .block_size(BlockSize::Bits256)
///     .build()?;
/// filter.insert_item("hello");
/// assert!(filter.contains_item("hello"));
/// # Ok::<(), SplitBlockError>(())
/// ```
pub mod prelude {
    pub use crate::builder::SplitBlockFilterBuilder;
    pub use crate::core::filter::{BloomFilter, SharedBloomFilter};
    pub use crate::core::{BlockSize, FilterPlan, Sizing};
    pub use crate::error::{Result, SplitBlockError};
    pub use crate::filters::SplitBlockBloomFilter;
    pub use crate::hash::{Fnv1aHasher, KeyHasher};
    pub use crate::simd::Backend;
    pub use crate::sync::LockedSplitBlockFilter;

    #[cfg(feature = "xxhash")]
    pub use crate::hash::XxHasher;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let mut filter = SplitBlockBloomFilter::new(100, 0.01).unwrap();
        filter.insert_key(b"test");
        assert!(filter.contains_key(b"test"));
    }

    #[test]
    fn test_trait_usage() {
        fn exercise<F: BloomFilter>(filter: &mut F) {
            filter.insert(42);
            assert!(filter.contains(42));
            filter.clear();
            assert!(filter.is_empty());
        }

        let mut filter = SplitBlockBloomFilter::new(100, 0.01).unwrap();
        exercise(&mut filter);
    }

    #[test]
    fn test_builder() {
        let filter = SplitBlockFilterBuilder::new()
            .expected_keys(1000)
            .bits_per_key(10.0, 7)
            .build()
            .unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.hashes_per_key(), 7);
    }

    #[test]
    fn test_locked_filter_shared_trait() {
        use std::sync::Arc;

        let filter = Arc::new(LockedSplitBlockFilter::new(1000, 0.01).unwrap());
        SharedBloomFilter::insert(&*filter, 5);

        let filter_clone = Arc::clone(&filter);
        std::thread::spawn(move || {
            assert!(SharedBloomFilter::contains(&*filter_clone, 5));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SplitBlockBloomFilter>();
        assert_send_sync::<LockedSplitBlockFilter>();
    }
}
