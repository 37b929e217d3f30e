//! Hashing: key hashers, the stream mixer, and in-block position generation.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs      - KeyHasher trait and FNV-1a (bytes/items → u64)
//! ├── mix.rs         - SplitMix64 finalizer, h1/h2 stream derivation
//! ├── strategies.rs  - Double-hashed positions inside one block
//! ├── xxhash.rs      - XXH3 key hasher (optional, feature = "xxhash")
//! └── mod.rs         - This file (public API)
//! ```
//!
//! # Pipeline
//!
//! ```text
//! key bytes ──KeyHasher──▶ h ──mix──▶ h1 ──mask──▶ block index
//!                               └───▶ h2 ──DoubleHashing──▶ BlockMask
//! ```
//!
//! # Examples
//!
//! ```
//! use splitbloom::core::BlockSize;
//! use splitbloom::hash::{DoubleHashing, Fnv1aHasher, KeyHasher, KeyHashes};
//!
//! let h = Fnv1aHasher.hash_key(b"hello");
//! let streams = KeyHashes::derive(h);
//! let mask = DoubleHashing.mask(streams.h2, 10, BlockSize::Bits512);
//! assert!(mask.count_ones() <= 10);
//! ```

pub mod hasher;
pub mod mix;
pub mod strategies;

#[cfg(feature = "xxhash")]
pub mod xxhash;

pub use hasher::{fnv1a64, Fnv1aHasher, Fnv1aState, KeyHasher};
pub use mix::{mix64, KeyHashes};
pub use strategies::DoubleHashing;

#[cfg(feature = "xxhash")]
pub use xxhash::XxHasher;
