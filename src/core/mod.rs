//! Core building blocks of the split-block filter.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── addressing.rs - Primary hash → block index (masking)
//! ├── block.rs      - BlockSize and block-shaped BlockMask
//! ├── filter.rs     - BloomFilter / SharedBloomFilter traits
//! ├── params.rs     - Sizing math and FilterPlan
//! ├── storage.rs    - Cache-line-aligned block storage
//! └── mod.rs        - This file (public API)
//! ```
//!
//! # Layout
//!
//! Storage is an array of 64-byte cache lines. A 512-bit block is exactly
//! one line; 256-bit blocks pack two per line. Every key touches one block,
//! hence at most one cache line per insert or query.
//!
//! ```text
//! line 0                    line 1
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ w0 w1 w2 ... w7      │  │ w0 w1 w2 ... w7      │   Bits512: 1 block/line
//! └──────────────────────┘  └──────────────────────┘
//! ┌──────────┬───────────┐  ┌──────────┬───────────┐
//! │ blk 0    │ blk 1     │  │ blk 2    │ blk 3     │   Bits256: 2 blocks/line
//! └──────────┴───────────┘  └──────────┴───────────┘
//! ```

pub mod addressing;
pub mod block;
pub mod filter;
pub mod params;
pub mod storage;

pub use addressing::BlockAddresser;
pub use block::{BlockMask, BlockSize};
pub use filter::{BloomFilter, SharedBloomFilter};
pub use params::{
    block_count_for_bits, blocked_fp_rate, expected_fp_rate, optimal_bit_count,
    optimal_hash_count, plan, plan_for_bits_per_key, plan_for_fpr, FilterPlan, Sizing,
};
pub use storage::{BlockStorage, CacheLine, CACHE_LINE_BYTES};
