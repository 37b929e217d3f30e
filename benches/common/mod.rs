//! Shared data generators and constants for all benchmarks
//!
//! Key sets come from a seeded `StdRng` so runs are comparable.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splitbloom::{BlockSize, SplitBlockBloomFilter, SplitBlockFilterBuilder};
use std::collections::HashSet;

/// Seed shared by every generator.
pub const SEED: u64 = 0x5b1f_b100_u64;

// DATA GENERATORS

/// Random 64-bit key hashes.
pub fn generate_u64s(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..count).map(|_| rng.gen()).collect()
}

/// Random alphanumeric keys of fixed length.
pub fn generate_keys(count: usize, len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(SEED ^ len as u64);
    (0..count)
        .map(|_| (&mut rng).sample_iter(&Alphanumeric).take(len).collect())
        .collect()
}

/// Two disjoint hash sets: one to insert, one that is never inserted.
pub fn create_disjoint_sets(present: usize, absent: usize) -> (Vec<u64>, Vec<u64>) {
    let mut rng = StdRng::seed_from_u64(SEED.rotate_left(17));
    let mut seen = HashSet::with_capacity(present + absent);
    let mut draw = |count: usize| {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let hash: u64 = rng.gen();
            if seen.insert(hash) {
                out.push(hash);
            }
        }
        out
    };
    let inserted = draw(present);
    let missing = draw(absent);
    (inserted, missing)
}

// CONSTANTS

/// Filter capacities: L1-resident up to DRAM-bound.
pub const SIZES: &[usize] = &[1_000, 10_000, 100_000, 1_000_000, 10_000_000];

/// Target false positive rates.
pub const FP_RATES: &[f64] = &[0.1, 0.01, 0.001, 0.0001];

/// Both block widths.
pub const BLOCK_SIZES: &[BlockSize] = &[BlockSize::Bits256, BlockSize::Bits512];

// HELPERS

/// Filter sized for `capacity` keys at 1%.
pub fn filter_for(capacity: usize, block_size: BlockSize) -> SplitBlockBloomFilter {
    SplitBlockFilterBuilder::new()
        .expected_keys(capacity as u64)
        .false_positive_rate(0.01)
        .block_size(block_size)
        .build()
        .expect("benchmark filter")
}

/// Filter already holding `keys`.
pub fn filled_filter(keys: &[u64], fp_rate: f64) -> SplitBlockBloomFilter {
    let mut filter = SplitBlockBloomFilter::new(keys.len() as u64, fp_rate).expect("benchmark filter");
    filter.insert_batch(keys);
    filter
}

/// Human-readable size in bytes.
pub fn format_memory(bytes: usize) -> String {
    if bytes >= 1 << 20 {
        format!("{:.1} MiB", bytes as f64 / (1 << 20) as f64)
    } else if bytes >= 1 << 10 {
        format!("{:.1} KiB", bytes as f64 / (1 << 10) as f64)
    } else {
        format!("{} B", bytes)
    }
}
