//! Bloom filter implementations.
//!
//! - [`SplitBlockBloomFilter`]: one cache-line-sized block per key, vector
//!   set/test, power-of-two block count.
//!
//! # Choosing Parameters
//!
//! | Block size | Accuracy at equal memory | Per-op cost          |
//! |------------|--------------------------|----------------------|
//! | 512 bits   | better                   | one full cache line  |
//! | 256 bits   | slightly worse           | half a cache line    |
//!
//! Size by target false positive rate ([`SplitBlockBloomFilter::new`]) unless
//! the memory budget is fixed, in which case use
//! [`SplitBlockBloomFilter::with_bits_per_key`].
//!
//! # Examples
//!
//! ```
//! use splitbloom::filters::SplitBlockBloomFilter;
//!
//! let mut filter = SplitBlockBloomFilter::new(10_000, 0.01)?;
//! filter.insert_batch(&[1, 2, 3]);
//! assert!(filter.contains_all(&[1, 2, 3]));
//! # Ok::<(), splitbloom::SplitBlockError>(())
//! ```

pub mod split_block;

pub use split_block::SplitBlockBloomFilter;
