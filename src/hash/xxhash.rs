//! XXH3 key hasher (feature `xxhash`).
//!
//! Noticeably faster than FNV-1a on keys longer than a few dozen bytes.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "xxhash")]
//! # {
//! use splitbloom::hash::{KeyHasher, XxHasher};
//!
//! let hasher = XxHasher::with_seed(7);
//! assert_ne!(hasher.hash_key(b"url"), XxHasher::new().hash_key(b"url"));
//! # }
//! ```

use super::hasher::KeyHasher;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// XXH3-64 key hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Hasher with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// The configured seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl KeyHasher for XxHasher {
    #[inline]
    fn hash_key(&self, bytes: &[u8]) -> u64 {
        if self.seed == 0 {
            xxh3_64(bytes)
        } else {
            xxh3_64_with_seed(bytes, self.seed)
        }
    }

    fn name(&self) -> &'static str {
        "XXH3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_zero_matches_unseeded() {
        assert_eq!(XxHasher::new().hash_key(b"abc"), xxh3_64(b"abc"));
        assert_eq!(XxHasher::with_seed(0).hash_key(b"abc"), xxh3_64_with_seed(b"abc", 0));
    }

    #[test]
    fn test_seeds_differ() {
        let a = XxHasher::with_seed(1).hash_key(b"key");
        let b = XxHasher::with_seed(2).hash_key(b"key");
        assert_ne!(a, b);
    }
}
