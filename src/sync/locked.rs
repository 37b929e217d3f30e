//! Split-block filter behind a single reader-writer lock.
//!
//! The filter itself holds no locks: a block OR is not atomic, so an insert
//! racing another insert or query on the same block needs outside
//! synchronization. [`LockedSplitBlockFilter`] provides the simplest form,
//! one `parking_lot::RwLock` around the whole filter:
//!
//! - `contains` takes a shared lock; queries run in parallel.
//! - `insert` and `clear` take the exclusive lock.
//! - Batch operations take the lock once for the whole batch.
//!
//! `parking_lot::RwLock` is writer-fair and does not poison, so a panicking
//! reader never wedges later writers.

use crate::core::SharedBloomFilter;
use crate::error::Result;
use crate::filters::SplitBlockBloomFilter;
use crate::hash::{Fnv1aHasher, KeyHasher};
use parking_lot::{RwLock, RwLockReadGuard};
use std::hash::Hash;

/// Thread-safe split-block filter for `Arc` sharing.
///
/// # Examples
///
/// ```
/// use splitbloom::sync::LockedSplitBlockFilter;
/// use std::sync::Arc;
///
/// let filter = Arc::new(LockedSplitBlockFilter::new(1000, 0.01)?);
/// let writer = Arc::clone(&filter);
///
/// std::thread::spawn(move || writer.insert_key(b"from-thread"))
///     .join()
///     .unwrap();
///
/// assert!(filter.contains_key(b"from-thread"));
/// # Ok::<(), splitbloom::SplitBlockError>(())
/// ```
#[derive(Debug)]
pub struct LockedSplitBlockFilter<H = Fnv1aHasher>
where
    H: KeyHasher,
{
    inner: RwLock<SplitBlockBloomFilter<H>>,
}

impl LockedSplitBlockFilter<Fnv1aHasher> {
    /// See [`SplitBlockBloomFilter::new`].
    ///
    /// # Errors
    ///
    /// Same as [`SplitBlockBloomFilter::new`].
    pub fn new(expected_keys: u64, fp_rate: f64) -> Result<Self> {
        SplitBlockBloomFilter::new(expected_keys, fp_rate).map(Self::from_filter)
    }

    /// See [`SplitBlockBloomFilter::with_bits_per_key`].
    ///
    /// # Errors
    ///
    /// Same as [`SplitBlockBloomFilter::with_bits_per_key`].
    pub fn with_bits_per_key(expected_keys: u64, bits_per_key: f64, hashes_per_key: u32) -> Result<Self> {
        SplitBlockBloomFilter::with_bits_per_key(expected_keys, bits_per_key, hashes_per_key).map(Self::from_filter)
    }
}

impl<H> LockedSplitBlockFilter<H>
where
    H: KeyHasher,
{
    /// Wrap an existing filter, keeping its contents.
    #[must_use]
    pub fn from_filter(filter: SplitBlockBloomFilter<H>) -> Self {
        Self {
            inner: RwLock::new(filter),
        }
    }

    /// Record a key hash under the write lock.
    pub fn insert(&self, hash: u64) {
        self.inner.write().insert(hash);
    }

    /// Query a key hash under the read lock.
    #[must_use]
    pub fn contains(&self, hash: u64) -> bool {
        self.inner.read().contains(hash)
    }

    /// Insert raw bytes.
    pub fn insert_key(&self, key: &[u8]) {
        self.inner.write().insert_key(key);
    }

    /// Query raw bytes.
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Insert any `Hash` value.
    pub fn insert_item<T: Hash + ?Sized>(&self, item: &T) {
        self.inner.write().insert_item(item);
    }

    /// Query any `Hash` value.
    #[must_use]
    pub fn contains_item<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.inner.read().contains_item(item)
    }

    /// Insert all hashes under one write lock.
    pub fn insert_batch(&self, hashes: &[u64]) {
        self.inner.write().insert_batch(hashes);
    }

    /// Query all hashes under one read lock.
    #[must_use]
    pub fn contains_batch(&self, hashes: &[u64]) -> Vec<bool> {
        self.inner.read().contains_batch(hashes)
    }

    /// Reset to the empty set.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Number of inserts so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// `true` if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Shared access to the wrapped filter for introspection.
    ///
    /// Writers block while the guard is alive.
    pub fn read(&self) -> RwLockReadGuard<'_, SplitBlockBloomFilter<H>> {
        self.inner.read()
    }

    /// Deep copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> SplitBlockBloomFilter<H>
    where
        H: Clone,
    {
        self.inner.read().clone()
    }

    /// Unwrap the filter.
    #[must_use]
    pub fn into_inner(self) -> SplitBlockBloomFilter<H> {
        self.inner.into_inner()
    }
}

impl<H> From<SplitBlockBloomFilter<H>> for LockedSplitBlockFilter<H>
where
    H: KeyHasher,
{
    fn from(filter: SplitBlockBloomFilter<H>) -> Self {
        Self::from_filter(filter)
    }
}

impl<H> SharedBloomFilter for LockedSplitBlockFilter<H>
where
    H: KeyHasher,
{
    fn insert(&self, hash: u64) {
        LockedSplitBlockFilter::insert(self, hash);
    }

    fn contains(&self, hash: u64) -> bool {
        LockedSplitBlockFilter::contains(self, hash)
    }

    fn clear(&self) {
        LockedSplitBlockFilter::clear(self);
    }

    fn len(&self) -> usize {
        LockedSplitBlockFilter::len(self)
    }

    fn bit_count(&self) -> usize {
        self.inner.read().bit_count()
    }

    fn hash_count(&self) -> usize {
        self.inner.read().hashes_per_key() as usize
    }

    fn false_positive_rate(&self) -> f64 {
        self.inner.read().estimated_false_positive_rate()
    }

    fn insert_batch(&self, hashes: &[u64]) {
        LockedSplitBlockFilter::insert_batch(self, hashes);
    }

    fn contains_batch(&self, hashes: &[u64]) -> Vec<bool> {
        LockedSplitBlockFilter::contains_batch(self, hashes)
    }
}
