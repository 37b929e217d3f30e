//! Sizing math for split-block filters.
//!
//! Turns caller intent into a concrete [`FilterPlan`]: how many blocks, how
//! wide each block is, and how many bits each key sets inside its block.
//!
//! # Mathematical Background
//!
//! Given `n` expected keys and a target false positive rate `ε`:
//!
//! - `M = ⌈-n × ln(ε) / (ln 2)²⌉` total bits
//! - `blocks = next_pow2(⌈M / bits_per_block⌉)`
//! - `k = round((M / n) × ln 2)`, clamped to `[1, bits_per_block]`
//!
//! Alternatively the caller fixes `bits_per_key` and `k` directly, in which
//! case `M = ⌈n × bits_per_key⌉` and `k` is taken as given.
//!
//! Block count is always a power of two so the block index is a mask of the
//! primary hash rather than a modulo.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Putze, Sanders, Singler (2007). "Cache-, Hash- and Space-Efficient Bloom Filters"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::core::block::BlockSize;
use crate::error::{Result, SplitBlockError};
use crate::util::bitops::{ceil_div, next_power_of_two};
use std::f64::consts::LN_2;

/// (ln 2)², used by the capacity formula.
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Minimum hashes per key.
pub const MIN_HASHES_PER_KEY: u32 = 1;

/// Maximum hashes per key when supplied explicitly.
pub const MAX_EXPLICIT_HASHES_PER_KEY: u32 = 32;

/// Default bits per key for [`Sizing::default_bits_per_key`].
pub const DEFAULT_BITS_PER_KEY: f64 = 10.0;

/// Default bits set per key for [`Sizing::default_bits_per_key`].
pub const DEFAULT_HASHES_PER_KEY: u32 = 8;

/// Upper bound on a single allocation, in bits (2^61 bits = 256 PiB).
const MAX_TOTAL_BITS: u64 = 1 << 61;

/// How a filter's size is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Size from a target false positive probability in (0, 1).
    FalsePositiveRate(f64),
    /// Size from an explicit memory budget and hash count.
    BitsPerKey {
        /// Bits of storage per expected key (> 0).
        bits_per_key: f64,
        /// Bits set per key inside its block, in `[1, 32]`.
        hashes_per_key: u32,
    },
}

impl Sizing {
    /// 10 bits per key, 8 bits set per key.
    #[must_use]
    pub const fn default_bits_per_key() -> Self {
        Self::BitsPerKey {
            bits_per_key: DEFAULT_BITS_PER_KEY,
            hashes_per_key: DEFAULT_HASHES_PER_KEY,
        }
    }

    /// Check the sizing parameters without computing a plan.
    ///
    /// # Errors
    ///
    /// - [`SplitBlockError::FalsePositiveRateOutOfBounds`] for a rate outside (0, 1)
    /// - [`SplitBlockError::InvalidBitsPerKey`] for a non-finite or non-positive budget
    /// - [`SplitBlockError::InvalidHashCount`] for a hash count outside `[1, 32]`
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::FalsePositiveRate(fp_rate) => validate_fp_rate(fp_rate),
            Self::BitsPerKey {
                bits_per_key,
                hashes_per_key,
            } => {
                if !bits_per_key.is_finite() || bits_per_key <= 0.0 {
                    return Err(SplitBlockError::invalid_bits_per_key(bits_per_key));
                }
                if !(MIN_HASHES_PER_KEY..=MAX_EXPLICIT_HASHES_PER_KEY).contains(&hashes_per_key) {
                    return Err(SplitBlockError::invalid_hash_count(
                        hashes_per_key,
                        MIN_HASHES_PER_KEY,
                        MAX_EXPLICIT_HASHES_PER_KEY,
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Concrete geometry of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterPlan {
    /// Number of blocks (always a power of two).
    pub block_count: u64,
    /// Width of every block.
    pub block_size: BlockSize,
    /// Bits set per key inside its block.
    pub hashes_per_key: u32,
}

impl FilterPlan {
    /// Total bits across all blocks.
    #[must_use]
    pub const fn total_bits(&self) -> u64 {
        self.block_count * self.block_size.bits() as u64
    }

    /// Total bytes across all blocks.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.block_count * self.block_size.bytes() as u64
    }

    /// Bits of storage per expected key.
    #[must_use]
    pub fn bits_per_key(&self, expected_keys: u64) -> f64 {
        self.total_bits() as f64 / expected_keys.max(1) as f64
    }
}

fn validate_fp_rate(fp_rate: f64) -> Result<()> {
    // NaN fails both comparisons.
    if fp_rate > 0.0 && fp_rate < 1.0 {
        Ok(())
    } else {
        Err(SplitBlockError::fp_rate_out_of_bounds(fp_rate))
    }
}

/// Classic Bloom capacity: `⌈-n × ln(ε) / (ln 2)²⌉`, at least 1.
///
/// `n = 0` is treated as 1.
///
/// # Errors
///
/// - [`SplitBlockError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1)
/// - [`SplitBlockError::InvalidParameters`] if the result is unreasonably large
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::optimal_bit_count;
///
/// let bits = optimal_bit_count(1000, 0.01).unwrap();
/// assert_eq!(bits, 9586);
///
/// assert!(optimal_bit_count(1000, 0.0).is_err());
/// ```
pub fn optimal_bit_count(n: u64, fp_rate: f64) -> Result<u64> {
    validate_fp_rate(fp_rate)?;

    let n = n.max(1) as f64;
    let m = (-n * fp_rate.ln() / LN2_SQUARED).ceil();

    if !m.is_finite() || m > MAX_TOTAL_BITS as f64 {
        return Err(SplitBlockError::invalid_parameters(format!(
            "filter would need {:.0} bits; increase the false positive rate or reduce expected keys",
            m
        )));
    }

    Ok((m as u64).max(1))
}

/// Optimal bits per key: `round((m / n) × ln 2)`, clamped to `[1, max]`.
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::optimal_hash_count;
///
/// assert_eq!(optimal_hash_count(9586, 1000, 512), 7);
/// assert_eq!(optimal_hash_count(10, 1000, 512), 1);
/// assert_eq!(optimal_hash_count(1 << 20, 1, 512), 512);
/// ```
#[must_use]
pub fn optimal_hash_count(m: u64, n: u64, max: u32) -> u32 {
    let k = (m as f64 / n.max(1) as f64) * LN_2;
    let k = k.round();
    if k >= f64::from(max) {
        max
    } else {
        (k as u32).max(MIN_HASHES_PER_KEY)
    }
}

/// Power-of-two block count covering `total_bits`, at least one block.
///
/// # Errors
///
/// [`SplitBlockError::InvalidParameters`] if the count overflows.
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::block_count_for_bits;
/// use splitbloom::core::BlockSize;
///
/// assert_eq!(block_count_for_bits(0, BlockSize::Bits512).unwrap(), 1);
/// assert_eq!(block_count_for_bits(513, BlockSize::Bits512).unwrap(), 2);
/// assert_eq!(block_count_for_bits(1537, BlockSize::Bits512).unwrap(), 4);
/// assert_eq!(block_count_for_bits(1537, BlockSize::Bits256).unwrap(), 8);
/// ```
pub fn block_count_for_bits(total_bits: u64, block_size: BlockSize) -> Result<u64> {
    let blocks = ceil_div(total_bits, u64::from(block_size.bits())).max(1);
    next_power_of_two(blocks).ok_or_else(|| {
        SplitBlockError::invalid_parameters(format!(
            "{} blocks cannot be rounded up to a power of two",
            blocks
        ))
    })
}

/// Plan a filter for `expected_keys` at the target false positive rate.
///
/// # Errors
///
/// See [`optimal_bit_count`] and [`block_count_for_bits`].
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::plan_for_fpr;
/// use splitbloom::core::BlockSize;
///
/// let plan = plan_for_fpr(10_000, 0.001, BlockSize::Bits512).unwrap();
/// assert_eq!(plan.block_count, 512);
/// assert_eq!(plan.hashes_per_key, 10);
/// ```
pub fn plan_for_fpr(expected_keys: u64, fp_rate: f64, block_size: BlockSize) -> Result<FilterPlan> {
    let n = expected_keys.max(1);
    let bits = optimal_bit_count(n, fp_rate)?;
    let block_count = block_count_for_bits(bits, block_size)?;
    let hashes_per_key = optimal_hash_count(bits, n, block_size.bits());

    Ok(FilterPlan {
        block_count,
        block_size,
        hashes_per_key,
    })
}

/// Plan a filter from an explicit bits-per-key budget and hash count.
///
/// # Errors
///
/// - [`SplitBlockError::InvalidBitsPerKey`] / [`SplitBlockError::InvalidHashCount`]
///   for out-of-range inputs
/// - [`SplitBlockError::InvalidParameters`] if the budget overflows
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::plan_for_bits_per_key;
/// use splitbloom::core::BlockSize;
///
/// let plan = plan_for_bits_per_key(1_000_000, 10.0, 8, BlockSize::Bits512).unwrap();
/// assert_eq!(plan.block_count, 32_768);
/// assert_eq!(plan.hashes_per_key, 8);
/// ```
pub fn plan_for_bits_per_key(
    expected_keys: u64,
    bits_per_key: f64,
    hashes_per_key: u32,
    block_size: BlockSize,
) -> Result<FilterPlan> {
    Sizing::BitsPerKey {
        bits_per_key,
        hashes_per_key,
    }
    .validate()?;

    let n = expected_keys.max(1) as f64;
    let bits = (n * bits_per_key).ceil();
    if !bits.is_finite() || bits > MAX_TOTAL_BITS as f64 {
        return Err(SplitBlockError::invalid_parameters(format!(
            "{} bits per key for {} keys exceeds the supported filter size",
            bits_per_key, n
        )));
    }

    Ok(FilterPlan {
        block_count: block_count_for_bits(bits as u64, block_size)?,
        block_size,
        hashes_per_key,
    })
}

/// Plan a filter for any [`Sizing`].
///
/// # Errors
///
/// See [`plan_for_fpr`] and [`plan_for_bits_per_key`].
pub fn plan(expected_keys: u64, sizing: Sizing, block_size: BlockSize) -> Result<FilterPlan> {
    match sizing {
        Sizing::FalsePositiveRate(fp_rate) => plan_for_fpr(expected_keys, fp_rate, block_size),
        Sizing::BitsPerKey {
            bits_per_key,
            hashes_per_key,
        } => plan_for_bits_per_key(expected_keys, bits_per_key, hashes_per_key, block_size),
    }
}

/// Classic (unblocked) false positive estimate `(1 - e^(-kn/m))^k`.
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::expected_fp_rate;
///
/// let fp = expected_fp_rate(9586, 1000, 7);
/// assert!((fp - 0.01).abs() < 0.001);
/// assert_eq!(expected_fp_rate(9586, 0, 7), 0.0);
/// ```
#[must_use]
pub fn expected_fp_rate(m: u64, n: u64, k: u32) -> f64 {
    if n == 0 || m == 0 {
        return 0.0;
    }
    let k = f64::from(k);
    let fill = 1.0 - (-(k * n as f64) / m as f64).exp();
    fill.powf(k).clamp(0.0, 1.0)
}

/// False positive estimate for a blocked filter.
///
/// Keys land in blocks following a Poisson distribution with mean
/// `λ = n / block_count`; the result is the per-block classic rate weighted
/// by that distribution. Blocking makes this strictly worse than
/// [`expected_fp_rate`] at the same total size.
///
/// # Examples
///
/// ```
/// use splitbloom::core::params::{blocked_fp_rate, expected_fp_rate};
///
/// let blocked = blocked_fp_rate(512, 512, 10_000, 10);
/// let classic = expected_fp_rate(512 * 512, 10_000, 10);
/// assert!(blocked > classic);
/// assert!(blocked < 0.003);
/// ```
#[must_use]
pub fn blocked_fp_rate(block_count: u64, bits_per_block: u32, n: u64, k: u32) -> f64 {
    if n == 0 || block_count == 0 {
        return 0.0;
    }

    let lambda = n as f64 / block_count as f64;
    let bits = f64::from(bits_per_block);
    let k_f = f64::from(k);
    let ln_lambda = lambda.ln();

    // Only the window around the mean carries weight; the tails beyond
    // 12 standard deviations are negligible.
    let spread = 12.0 * lambda.sqrt() + 32.0;
    let lower = (lambda - spread).max(0.0).floor() as u64;
    let upper = (lambda + spread).ceil() as u64;

    let mut ln_fact = ln_factorial(lower);
    let mut total = 0.0;
    for i in lower..=upper {
        if i > lower {
            ln_fact += (i as f64).ln();
        }
        let weight = (i as f64 * ln_lambda - lambda - ln_fact).exp();
        let fill = 1.0 - (1.0 - 1.0 / bits).powf(k_f * i as f64);
        total += weight * fill.powf(k_f);
    }

    total.clamp(0.0, 1.0)
}

/// `ln(n!)`, exact for small `n` and Stirling's series above.
fn ln_factorial(n: u64) -> f64 {
    if n < 32 {
        return (2..=n).map(|i| (i as f64).ln()).sum();
    }
    let x = n as f64;
    x * x.ln() - x + 0.5 * (2.0 * std::f64::consts::PI * x).ln() + 1.0 / (12.0 * x)
        - 1.0 / (360.0 * x * x * x)
}
