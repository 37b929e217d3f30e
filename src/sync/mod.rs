//! Thread-safe wrappers.
//!
//! [`SplitBlockBloomFilter`](crate::SplitBlockBloomFilter) is lock-free but
//! not safe for concurrent writers. Wrap it here to share it across threads
//! with `&self` methods via the [`SharedBloomFilter`](crate::core::SharedBloomFilter)
//! trait.
//!
//! | Type                       | Reads         | Writes          |
//! |----------------------------|---------------|-----------------|
//! | `SplitBlockBloomFilter`    | `&self`       | `&mut self`     |
//! | `LockedSplitBlockFilter`   | shared lock   | exclusive lock  |
//!
//! Read-only sharing needs no wrapper at all: `Arc<SplitBlockBloomFilter>`
//! answers `contains` from any number of threads.

pub mod locked;

pub use locked::LockedSplitBlockFilter;
