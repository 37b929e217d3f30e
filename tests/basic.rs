//! Basic tests - the filter end to end through the public API

use splitbloom::prelude::*;

#[test]
fn test_words_scenario() {
    let mut filter = SplitBlockBloomFilter::new(10_000, 0.001).unwrap();

    filter.insert_key(b"hello");
    filter.insert_key(b"god");
    filter.insert_key(b"gg");

    assert!(filter.contains_key(b"hello"), "inserted key must be found");
    assert!(filter.contains_key(b"god"), "inserted key must be found");
    assert!(filter.contains_key(b"gg"), "inserted key must be found");

    // Three keys in 512 blocks: an unrelated word is almost surely absent.
    assert!(!filter.contains_key(b"unrelated-word"));
    assert_eq!(filter.len(), 3);
}

#[test]
fn test_geometry_for_default_scenario() {
    let filter = SplitBlockBloomFilter::new(10_000, 0.001).unwrap();

    // 143,776 bits -> 281 blocks -> 512 blocks.
    assert_eq!(filter.block_count(), 512);
    assert_eq!(filter.bits_per_block(), 512);
    assert_eq!(filter.hashes_per_key(), 10);
    assert_eq!(filter.size_bytes(), 32 * 1024);
    assert_eq!(filter.bit_count(), 512 * 512);
    assert!(filter.block_count().is_power_of_two());
}

#[test]
fn test_clear_forgets_everything() {
    let mut filter = SplitBlockBloomFilter::new(1000, 0.01).unwrap();
    let keys: Vec<u64> = (0..500u64).map(|i| i * 7919).collect();
    filter.insert_batch(&keys);
    assert!(filter.contains_all(&keys));

    filter.clear();

    assert!(filter.is_empty());
    assert_eq!(filter.count_ones(), 0);
    assert!(!filter.contains_any(&keys));

    // Still usable after clearing.
    filter.insert(1);
    assert!(filter.contains(1));
}

#[test]
fn test_insert_twice_changes_nothing() {
    let mut once = SplitBlockBloomFilter::new(1000, 0.01).unwrap();
    let mut twice = SplitBlockBloomFilter::new(1000, 0.01).unwrap();

    once.insert_key(b"repeat");
    twice.insert_key(b"repeat");
    twice.insert_key(b"repeat");

    for i in 0..once.block_count() {
        assert_eq!(once.block(i), twice.block(i));
    }
    assert_eq!(twice.len(), 2);
    assert_eq!(twice.estimate_count(), 1);
}

#[test]
fn test_extreme_parameters_still_construct() {
    let mut filter = SplitBlockBloomFilter::new(1, 1e-300).unwrap();
    assert!(filter.block_count() >= 1);
    assert!(filter.hashes_per_key() >= 1);
    assert!(filter.hashes_per_key() <= filter.bits_per_block());

    filter.insert(0xfeed);
    assert!(filter.count_ones() >= 1);
    assert!(filter.contains(0xfeed));
}

#[test]
fn test_zero_keys_means_one() {
    let filter = SplitBlockBloomFilter::new(0, 0.5).unwrap();
    assert_eq!(filter.expected_keys(), 1);
    assert_eq!(filter.block_count(), 1);
}

#[test]
fn test_invalid_rates_are_errors() {
    for fp_rate in [0.0, 1.0, 1.5, -0.01, f64::NAN, f64::INFINITY] {
        let err = SplitBlockBloomFilter::new(1000, fp_rate).unwrap_err();
        assert!(err.is_configuration_error(), "{}", err);
    }
}

#[test]
fn test_bits_per_key_sizing() {
    let filter = SplitBlockBloomFilter::with_bits_per_key(10_000, 10.0, 7).unwrap();

    // 100,000 bits -> 196 blocks -> 256 blocks.
    assert_eq!(filter.block_count(), 256);
    assert_eq!(filter.hashes_per_key(), 7);

    assert!(SplitBlockBloomFilter::with_bits_per_key(10_000, 10.0, 0).is_err());
    assert!(SplitBlockBloomFilter::with_bits_per_key(10_000, 10.0, 33).is_err());
    assert!(SplitBlockBloomFilter::with_bits_per_key(10_000, -1.0, 7).is_err());
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_unallocatable_filter_is_an_error() {
    let result = SplitBlockBloomFilter::with_bits_per_key(1 << 40, 1e6, 8);
    assert!(matches!(result, Err(SplitBlockError::AllocationFailed { .. })));

    let result = SplitBlockFilterBuilder::new()
        .expected_keys(1 << 40)
        .bits_per_key(1e6, 8)
        .build();
    let err = result.unwrap_err();
    assert!(matches!(err, SplitBlockError::AllocationFailed { .. }));
    assert!(!err.is_configuration_error());
}

#[test]
fn test_items_and_keys_share_hasher() {
    let mut filter = SplitBlockBloomFilter::new(1000, 0.01).unwrap();
    filter.insert_item("alpha");
    filter.insert_item(&42u64);

    assert!(filter.contains_item("alpha"));
    assert!(filter.contains_item(&42u64));

    let hash = filter.hasher().hash_key(b"raw");
    filter.insert_key(b"raw");
    assert!(filter.contains(hash));
}

#[test]
fn test_block_size_variants() {
    for block_size in [BlockSize::Bits256, BlockSize::Bits512] {
        let mut filter = SplitBlockFilterBuilder::new()
            .expected_keys(5_000)
            .false_positive_rate(0.01)
            .block_size(block_size)
            .build()
            .unwrap();

        assert_eq!(filter.bits_per_block(), block_size.bits());
        let keys: Vec<u64> = (0..5_000u64).map(|i| i.wrapping_mul(0x9e37_79b9)).collect();
        filter.insert_batch(&keys);
        assert!(filter.contains_all(&keys));
    }
}

#[test]
fn test_estimated_rate_tracks_load() {
    let mut filter = SplitBlockBloomFilter::new(10_000, 0.01).unwrap();
    assert_eq!(filter.estimated_false_positive_rate(), 0.0);

    let keys: Vec<u64> = (0..10_000u64).collect();
    filter.insert_batch(&keys);

    let estimated = filter.estimated_false_positive_rate();
    assert!(estimated > 0.0 && estimated < 0.01, "estimated {}", estimated);
    assert!(filter.fill_ratio() > 0.0 && filter.fill_ratio() < 1.0);
}
