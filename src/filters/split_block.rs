//! Split-block Bloom filter.
//!
//! The bit array is cut into fixed-width blocks (256 or 512 bits) and every
//! key lives entirely inside one of them. An operation is therefore one
//! block lookup plus one whole-block vector OR (insert) or AND-compare
//! (query), touching a single cache line.
//!
//! # Pipeline
//!
//! ```text
//! key hash h
//!   ├─ h1 = mix(h)          ──mask──▶ block index
//!   └─ h2 = mix(h1) | 1     ──double hashing──▶ BlockMask (≤ k bits)
//!                                         │
//!                  insert: block |= mask  │  contains: block & mask == mask
//! ```
//!
//! # Accuracy
//!
//! Blocking costs accuracy relative to a classic Bloom filter of the same
//! size because keys do not spread evenly over blocks. Rounding the block
//! count up to a power of two oversizes most filters, so the realised false
//! positive rate is usually below the target. Use
//! [`estimated_false_positive_rate`](SplitBlockBloomFilter::estimated_false_positive_rate)
//! for the model that accounts for both effects.
//!
//! # Thread Safety
//!
//! The filter holds no locks. `contains` only reads and may run concurrently
//! with other `contains` calls through `&self`; `insert` and `clear` need
//! `&mut self`. For shared writers use
//! [`LockedSplitBlockFilter`](crate::sync::LockedSplitBlockFilter).

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

use crate::core::filter::BloomFilter;
use crate::core::params::{self, blocked_fp_rate, FilterPlan, Sizing};
use crate::core::{BlockAddresser, BlockMask, BlockSize, BlockStorage};
use crate::error::{Result, SplitBlockError};
use crate::hash::{DoubleHashing, Fnv1aHasher, KeyHasher, KeyHashes};
use crate::simd::{Backend, BlockKernel, BlockOps};
use std::hash::Hash;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Cache-line-local Bloom filter over 64-bit key hashes.
///
/// # Type Parameters
///
/// * `H` - Key hasher used by the `*_key` / `*_item` conveniences
///   (default: [`Fnv1aHasher`]). The `u64` entry points bypass it.
///
/// # Examples
///
/// ```
/// use splitbloom::SplitBlockBloomFilter;
///
/// let mut filter = SplitBlockBloomFilter::new(10_000, 0.001)?;
///
/// filter.insert_key(b"hello");
/// filter.insert(0xdead_beef);
///
/// assert!(filter.contains_key(b"hello"));
/// assert!(filter.contains(0xdead_beef));
/// assert_eq!(filter.block_count(), 512);
/// # Ok::<(), splitbloom::SplitBlockError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SplitBlockBloomFilter<H = Fnv1aHasher>
where
    H: KeyHasher,
{
    /// Aligned, zero-initialised blocks.
    storage: BlockStorage,
    /// Primary hash → block index.
    addresser: BlockAddresser,
    block_size: BlockSize,
    /// Bits set per key inside its block.
    hashes_per_key: u32,
    /// Resolved set/test backend.
    kernel: BlockKernel,
    hasher: H,
    /// Capacity the filter was sized for (after coercing 0 to 1).
    expected_keys: u64,
    /// How the geometry was derived.
    sizing: Sizing,
    /// `insert` calls since construction or the last `clear`.
    insert_count: usize,
}

impl SplitBlockBloomFilter<Fnv1aHasher> {
    /// Filter for `expected_keys` at target false positive rate `fp_rate`,
    /// with 512-bit blocks and the widest backend the CPU supports.
    ///
    /// `expected_keys == 0` is treated as 1.
    ///
    /// # Errors
    ///
    /// - [`SplitBlockError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1)
    /// - [`SplitBlockError::AllocationFailed`] if storage cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::SplitBlockBloomFilter;
    ///
    /// let filter = SplitBlockBloomFilter::new(1000, 0.01)?;
    /// assert!(filter.is_empty());
    /// assert!(SplitBlockBloomFilter::new(1000, 1.5).is_err());
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    pub fn new(expected_keys: u64, fp_rate: f64) -> Result<Self> {
        Self::with_hasher(expected_keys, fp_rate, Fnv1aHasher)
    }

    /// Filter sized from an explicit memory budget.
    ///
    /// # Errors
    ///
    /// - [`SplitBlockError::InvalidBitsPerKey`] unless `bits_per_key` is finite and > 0
    /// - [`SplitBlockError::InvalidHashCount`] unless `hashes_per_key` is in `[1, 32]`
    /// - [`SplitBlockError::AllocationFailed`] if storage cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::SplitBlockBloomFilter;
    ///
    /// let filter = SplitBlockBloomFilter::with_bits_per_key(1_000_000, 10.0, 8)?;
    /// assert_eq!(filter.hashes_per_key(), 8);
    /// assert_eq!(filter.block_count(), 32_768);
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    pub fn with_bits_per_key(expected_keys: u64, bits_per_key: f64, hashes_per_key: u32) -> Result<Self> {
        Self::from_parts(
            expected_keys,
            Sizing::BitsPerKey {
                bits_per_key,
                hashes_per_key,
            },
            BlockSize::default(),
            BlockKernel::detect(),
            Fnv1aHasher,
        )
    }
}

impl<H> SplitBlockBloomFilter<H>
where
    H: KeyHasher,
{
    /// Like [`new`](SplitBlockBloomFilter::new) with a custom key hasher.
    ///
    /// # Errors
    ///
    /// See [`new`](SplitBlockBloomFilter::new).
    pub fn with_hasher(expected_keys: u64, fp_rate: f64, hasher: H) -> Result<Self> {
        Self::from_parts(
            expected_keys,
            Sizing::FalsePositiveRate(fp_rate),
            BlockSize::default(),
            BlockKernel::detect(),
            hasher,
        )
    }

    pub(crate) fn from_parts(
        expected_keys: u64,
        sizing: Sizing,
        block_size: BlockSize,
        kernel: BlockKernel,
        hasher: H,
    ) -> Result<Self> {
        let expected_keys = expected_keys.max(1);
        let plan = params::plan(expected_keys, sizing, block_size)?;

        let block_count = usize::try_from(plan.block_count).map_err(|_| {
            SplitBlockError::invalid_parameters(format!(
                "{} blocks exceed the address space",
                plan.block_count
            ))
        })?;
        let storage = BlockStorage::zeroed(block_count, block_size)?;
        let addresser = BlockAddresser::new(plan.block_count)?;

        tracing::debug!(
            expected_keys,
            block_count = plan.block_count,
            bits_per_block = block_size.bits(),
            hashes_per_key = plan.hashes_per_key,
            backend = kernel.name(),
            hasher = hasher.name(),
            "constructed split-block filter"
        );

        Ok(Self {
            storage,
            addresser,
            block_size,
            hashes_per_key: plan.hashes_per_key,
            kernel,
            hasher,
            expected_keys,
            sizing,
            insert_count: 0,
        })
    }

    /// Block index and in-block mask for a key hash.
    ///
    /// Pure function of the hash and the filter geometry; exposed for
    /// diagnostics and tests.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::SplitBlockBloomFilter;
    ///
    /// let filter = SplitBlockBloomFilter::new(10_000, 0.001)?;
    /// let (index, mask) = filter.probe(42);
    /// assert!(index < filter.block_count());
    /// assert!(mask.count_ones() <= filter.hashes_per_key());
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn probe(&self, hash: u64) -> (usize, BlockMask) {
        let KeyHashes { h1, h2 } = KeyHashes::derive(hash);
        (
            self.addresser.index(h1),
            DoubleHashing.mask(h2, self.hashes_per_key, self.block_size),
        )
    }

    /// Record a key hash. Touches exactly one block.
    #[inline]
    pub fn insert(&mut self, hash: u64) {
        #[cfg(feature = "trace")]
        tracing::trace!(hash, "SplitBlockBloomFilter::insert");

        let (index, mask) = self.probe(hash);
        self.kernel.set(self.storage.block_mut(index), mask.as_slice());
        self.insert_count = self.insert_count.saturating_add(1);
    }

    /// `false` means the hash was definitely never inserted.
    #[inline]
    #[must_use]
    pub fn contains(&self, hash: u64) -> bool {
        #[cfg(feature = "trace")]
        tracing::trace!(hash, "SplitBlockBloomFilter::contains");

        let (index, mask) = self.probe(hash);
        self.kernel.test(self.storage.block(index), mask.as_slice())
    }

    /// Zero all blocks. Geometry, backend and hasher are unchanged.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.insert_count = 0;
        tracing::debug!(block_count = self.block_count(), "cleared split-block filter");
    }

    /// Hash raw key bytes with the filter's hasher and insert.
    #[inline]
    pub fn insert_key(&mut self, key: &[u8]) {
        let hash = self.hasher.hash_key(key);
        self.insert(hash);
    }

    /// Query raw bytes, hashed with the filter's [`KeyHasher`].
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.contains(self.hasher.hash_key(key))
    }

    /// Insert any `Hash` value.
    ///
    /// The item is streamed through a stable FNV-1a `Hasher` and the result
    /// re-hashed with the filter's [`KeyHasher`], so the same item maps to the
    /// same bits across runs and platforms.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::SplitBlockBloomFilter;
    ///
    /// let mut filter = SplitBlockBloomFilter::new(100, 0.01)?;
    /// filter.insert_item(&("user", 42u32));
    /// assert!(filter.contains_item(&("user", 42u32)));
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    #[inline]
    pub fn insert_item<T: Hash + ?Sized>(&mut self, item: &T) {
        let hash = self.hasher.hash_item(item);
        self.insert(hash);
    }

    /// Query any `Hash` value; see [`insert_item`](Self::insert_item).
    #[inline]
    #[must_use]
    pub fn contains_item<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.contains(self.hasher.hash_item(item))
    }

    /// Insert every hash in order.
    pub fn insert_batch(&mut self, hashes: &[u64]) {
        for &hash in hashes {
            self.insert(hash);
        }
    }

    /// One result per input hash, in order.
    #[must_use]
    pub fn contains_batch(&self, hashes: &[u64]) -> Vec<bool> {
        hashes.iter().map(|&h| self.contains(h)).collect()
    }

    /// Parallel [`contains_batch`](Self::contains_batch).
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn contains_batch_par(&self, hashes: &[u64]) -> Vec<bool> {
        hashes.par_iter().map(|&h| self.contains(h)).collect()
    }

    /// `true` if every hash might be present; `true` for an empty slice.
    #[must_use]
    pub fn contains_all(&self, hashes: &[u64]) -> bool {
        hashes.iter().all(|&h| self.contains(h))
    }

    /// `true` if any hash might be present; `false` for an empty slice.
    #[must_use]
    pub fn contains_any(&self, hashes: &[u64]) -> bool {
        hashes.iter().any(|&h| self.contains(h))
    }

    /// Number of blocks, always a power of two.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.storage.block_count()
    }

    /// Bits in one block: 256 or 512.
    #[must_use]
    pub const fn bits_per_block(&self) -> u32 {
        self.block_size.bits()
    }

    /// Block width.
    #[must_use]
    pub const fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Positions drawn per key (`k`).
    #[must_use]
    pub const fn hashes_per_key(&self) -> u32 {
        self.hashes_per_key
    }

    /// Logical size of the bit array: `block_count × bits_per_block / 8`.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.block_count() * self.block_size.bytes()
    }

    /// Total bits across all blocks.
    #[must_use]
    pub fn bit_count(&self) -> usize {
        self.block_count() * self.block_size.bits() as usize
    }

    /// Capacity the filter was sized for.
    #[must_use]
    pub const fn expected_keys(&self) -> u64 {
        self.expected_keys
    }

    /// Sizing mode the filter was built with.
    #[must_use]
    pub const fn sizing(&self) -> Sizing {
        self.sizing
    }

    /// Geometry as a [`FilterPlan`].
    #[must_use]
    pub fn plan(&self) -> FilterPlan {
        FilterPlan {
            block_count: self.addresser.block_count(),
            block_size: self.block_size,
            hashes_per_key: self.hashes_per_key,
        }
    }

    /// Kernel backend chosen at construction.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.kernel.backend()
    }

    /// Key hasher used by the byte and item conveniences.
    #[must_use]
    pub const fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of `insert` calls since construction or the last `clear`,
    /// duplicates included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.insert_count
    }

    /// `true` if nothing has been inserted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.insert_count == 0
    }

    /// Set bits across all blocks.
    #[must_use]
    pub fn count_ones(&self) -> u64 {
        self.storage.count_ones()
    }

    /// Fraction of bits set, in `[0, 1]`.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / self.bit_count() as f64
    }

    /// False positive rate predicted by the blocked-Bloom model at the
    /// current insert count.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitbloom::SplitBlockBloomFilter;
    ///
    /// let mut filter = SplitBlockBloomFilter::new(1000, 0.01)?;
    /// assert_eq!(filter.estimated_false_positive_rate(), 0.0);
    ///
    /// for i in 0..1000u64 {
    ///     filter.insert(i);
    /// }
    /// assert!(filter.estimated_false_positive_rate() < 0.01);
    /// # Ok::<(), splitbloom::SplitBlockError>(())
    /// ```
    #[must_use]
    pub fn estimated_false_positive_rate(&self) -> f64 {
        blocked_fp_rate(
            self.addresser.block_count(),
            self.bits_per_block(),
            self.insert_count as u64,
            self.hashes_per_key,
        )
    }

    /// Distinct keys inserted, estimated from per-block fill.
    ///
    /// Each block with `x` of `b` bits set contributes `-(b/k)·ln(1 - x/b)`.
    /// Unlike [`len`](Self::len), repeated inserts of one key count once.
    #[must_use]
    pub fn estimate_count(&self) -> usize {
        let bits = f64::from(self.bits_per_block());
        let k = f64::from(self.hashes_per_key);

        let total: f64 = self
            .storage
            .blocks()
            .map(|block| {
                let ones = block.iter().map(|w| w.count_ones()).sum::<u32>();
                if ones == 0 {
                    return 0.0;
                }
                // A saturated block has no finite estimate; treat it as nearly full.
                let ones = f64::from(ones).min(bits - 0.5);
                -(bits / k) * (1.0 - ones / bits).ln()
            })
            .sum();

        total.round() as usize
    }

    /// Raw lanes of block `index`, or `None` if out of range.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&[u64]> {
        (index < self.block_count()).then(|| self.storage.block(index))
    }
}

impl<H> BloomFilter for SplitBlockBloomFilter<H>
where
    H: KeyHasher,
{
    fn insert(&mut self, hash: u64) {
        SplitBlockBloomFilter::insert(self, hash);
    }

    fn contains(&self, hash: u64) -> bool {
        SplitBlockBloomFilter::contains(self, hash)
    }

    fn clear(&mut self) {
        SplitBlockBloomFilter::clear(self);
    }

    fn len(&self) -> usize {
        self.insert_count
    }

    fn bit_count(&self) -> usize {
        SplitBlockBloomFilter::bit_count(self)
    }

    fn hash_count(&self) -> usize {
        self.hashes_per_key as usize
    }

    fn false_positive_rate(&self) -> f64 {
        self.estimated_false_positive_rate()
    }
}
