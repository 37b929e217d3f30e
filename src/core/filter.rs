//! Filter traits.
//!
//! Filters in this crate are keyed by a caller-supplied 64-bit hash. Turning
//! arbitrary keys into that hash is the job of a [`KeyHasher`](crate::hash::KeyHasher);
//! the traits here only see the resulting `u64`.
//!
//! Two mutability contracts are offered:
//!
//! - [`BloomFilter`]: `&mut self` for writes. Zero synchronization; share
//!   across threads only behind a lock.
//! - [`SharedBloomFilter`]: `&self` everywhere, for filters that carry their
//!   own synchronization and can sit behind an `Arc`.
//!
//! Neither offers removal: clearing a bit could erase another key.

/// Insert-only probabilistic set keyed by 64-bit hashes.
///
/// # Guarantees
///
/// - After `insert(h)`, `contains(h)` is `true` until the next `clear()`.
/// - `contains(h) == false` means `h` was never inserted.
///
/// # Examples
///
/// ```
/// use splitbloom::core::BloomFilter;
/// use splitbloom::SplitBlockBloomFilter;
///
/// fn load<F: BloomFilter>(filter: &mut F, hashes: &[u64]) {
///     filter.insert_batch(hashes.iter().copied());
/// }
///
/// let mut filter = SplitBlockBloomFilter::new(1000, 0.01).unwrap();
/// load(&mut filter, &[1, 2, 3]);
/// assert!(BloomFilter::contains_all(&filter, [1, 2, 3]));
/// ```
pub trait BloomFilter: Send + Sync {
    /// Record a key hash.
    fn insert(&mut self, hash: u64);

    /// `false` if `hash` was definitely never inserted.
    #[must_use]
    fn contains(&self, hash: u64) -> bool;

    /// Reset to the empty set, keeping the geometry.
    fn clear(&mut self);

    /// Number of `insert` calls since construction or the last `clear`.
    #[must_use]
    fn len(&self) -> usize;

    /// `true` if nothing has been inserted.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bits of storage.
    #[must_use]
    fn bit_count(&self) -> usize;

    /// Bits set per key.
    #[must_use]
    fn hash_count(&self) -> usize;

    /// Estimated false positive rate at the current load.
    #[must_use]
    fn false_positive_rate(&self) -> f64;

    /// Insert every hash in order.
    fn insert_batch<I>(&mut self, hashes: I)
    where
        I: IntoIterator<Item = u64>,
        Self: Sized,
    {
        for hash in hashes {
            self.insert(hash);
        }
    }

    /// Membership of each hash, in input order.
    #[must_use]
    fn contains_batch<I>(&self, hashes: I) -> Vec<bool>
    where
        I: IntoIterator<Item = u64>,
        Self: Sized,
    {
        hashes.into_iter().map(|h| self.contains(h)).collect()
    }

    /// `true` if every hash might be present. Vacuously `true` when empty.
    #[must_use]
    fn contains_all<I>(&self, hashes: I) -> bool
    where
        I: IntoIterator<Item = u64>,
        Self: Sized,
    {
        hashes.into_iter().all(|h| self.contains(h))
    }

    /// `true` if at least one hash might be present.
    #[must_use]
    fn contains_any<I>(&self, hashes: I) -> bool
    where
        I: IntoIterator<Item = u64>,
        Self: Sized,
    {
        hashes.into_iter().any(|h| self.contains(h))
    }
}

/// [`BloomFilter`] with interior synchronization.
///
/// # Examples
///
/// ```
/// use splitbloom::core::SharedBloomFilter;
/// use splitbloom::sync::LockedSplitBlockFilter;
/// use std::sync::Arc;
/// use std::thread;
///
/// let filter = Arc::new(LockedSplitBlockFilter::new(10_000, 0.01).unwrap());
///
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let f = Arc::clone(&filter);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 f.insert(t * 1000 + i);
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert!(filter.contains(3042));
/// assert_eq!(filter.len(), 400);
/// ```
pub trait SharedBloomFilter: Send + Sync {
    /// Record a key hash.
    fn insert(&self, hash: u64);

    /// `false` if `hash` was definitely never inserted.
    #[must_use]
    fn contains(&self, hash: u64) -> bool;

    /// Reset to the empty set.
    fn clear(&self);

    /// Number of `insert` calls since construction or the last `clear`.
    #[must_use]
    fn len(&self) -> usize;

    /// `true` if nothing has been inserted.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bits of storage.
    #[must_use]
    fn bit_count(&self) -> usize;

    /// Bits set per key.
    #[must_use]
    fn hash_count(&self) -> usize;

    /// Estimated false positive rate at the current load.
    #[must_use]
    fn false_positive_rate(&self) -> f64;

    /// Insert every hash in order.
    fn insert_batch(&self, hashes: &[u64]) {
        for &hash in hashes {
            self.insert(hash);
        }
    }

    /// Membership of each hash, in input order.
    #[must_use]
    fn contains_batch(&self, hashes: &[u64]) -> Vec<bool> {
        hashes.iter().map(|&h| self.contains(h)).collect()
    }
}
