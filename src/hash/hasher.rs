//! Key hashing for the byte- and item-level convenience API.
//!
//! The filter core consumes a 64-bit hash per key and does not care where it
//! came from. These hashers turn raw bytes (or any `Hash` value) into that
//! 64-bit input. Any well-distributed hash works; the mixer in
//! [`crate::hash::mix`] cleans up weak low bits.

use std::hash::{Hash, Hasher};

/// FNV-1a 64-bit offset basis.
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hashes arbitrary key bytes to a 64-bit value.
///
/// Implementations must be deterministic: the same bytes always yield the
/// same hash for a given hasher value.
///
/// # Examples
///
/// ```
/// use splitbloom::hash::{Fnv1aHasher, KeyHasher};
///
/// let hasher = Fnv1aHasher::new();
/// assert_eq!(hasher.hash_key(b"hello"), hasher.hash_key(b"hello"));
/// assert_ne!(hasher.hash_key(b"hello"), hasher.hash_key(b"world"));
/// ```
pub trait KeyHasher: Send + Sync {
    /// Hash raw key bytes.
    fn hash_key(&self, bytes: &[u8]) -> u64;

    /// Hash any `Hash` value by streaming it through FNV-1a and hashing the
    /// resulting 8 bytes with [`hash_key`](Self::hash_key).
    fn hash_item<T: Hash + ?Sized>(&self, item: &T) -> u64
    where
        Self: Sized,
    {
        let mut state = Fnv1aState::new();
        item.hash(&mut state);
        self.hash_key(&state.finish().to_le_bytes())
    }

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// FNV-1a over raw bytes.
///
/// # Examples
///
/// ```
/// use splitbloom::hash::hasher::fnv1a64;
///
/// assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
/// assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
/// ```
#[inline]
#[must_use]
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Default key hasher: FNV-1a 64.
///
/// Deterministic across runs and platforms. Key hashes are mixed again
/// before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1aHasher;

impl Fnv1aHasher {
    /// Create a new FNV-1a hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeyHasher for Fnv1aHasher {
    #[inline]
    fn hash_key(&self, bytes: &[u8]) -> u64 {
        fnv1a64(bytes)
    }

    fn name(&self) -> &'static str {
        "FNV-1a"
    }
}

/// Streaming FNV-1a state usable as a `std::hash::Hasher`.
///
/// Unlike `DefaultHasher`, the output is stable across Rust releases.
#[derive(Debug, Clone)]
pub struct Fnv1aState {
    state: u64,
}

impl Fnv1aState {
    /// Fresh state at the offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aState {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aState {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv_reference_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut state = Fnv1aState::new();
        state.write(b"foo");
        state.write(b"bar");
        assert_eq!(state.finish(), fnv1a64(b"foobar"));
    }

    #[test]
    fn test_hash_item_deterministic() {
        let hasher = Fnv1aHasher::new();
        assert_eq!(hasher.hash_item("key"), hasher.hash_item("key"));
        assert_eq!(hasher.hash_item(&42u64), hasher.hash_item(&42u64));
        assert_ne!(hasher.hash_item(&1u64), hasher.hash_item(&2u64));
    }

    #[test]
    fn test_name() {
        assert_eq!(Fnv1aHasher.name(), "FNV-1a");
    }
}
