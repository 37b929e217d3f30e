//! Bit manipulation helpers used by sizing and storage.

/// Check if a number is a power of two.
///
/// # Examples
///
/// ```
/// use splitbloom::util::bitops::is_power_of_two;
///
/// assert!(is_power_of_two(1));
/// assert!(is_power_of_two(1024));
/// assert!(!is_power_of_two(0));
/// assert!(!is_power_of_two(100));
/// ```
#[inline(always)]
#[must_use]
pub const fn is_power_of_two(n: u64) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Smallest power of two `>= n`, treating 0 as 1.
///
/// Returns `None` when the result would not fit in a `u64`.
///
/// # Examples
///
/// ```
/// use splitbloom::util::bitops::next_power_of_two;
///
/// assert_eq!(next_power_of_two(0), Some(1));
/// assert_eq!(next_power_of_two(3), Some(4));
/// assert_eq!(next_power_of_two(1024), Some(1024));
/// assert_eq!(next_power_of_two(u64::MAX), None);
/// ```
#[inline]
#[must_use]
pub const fn next_power_of_two(n: u64) -> Option<u64> {
    if n <= 1 {
        return Some(1);
    }
    n.checked_next_power_of_two()
}

/// Ceiling division for unsigned integers.
///
/// # Panics
///
/// Panics if `divisor` is zero.
///
/// # Examples
///
/// ```
/// use splitbloom::util::bitops::ceil_div;
///
/// assert_eq!(ceil_div(0, 512), 0);
/// assert_eq!(ceil_div(1, 512), 1);
/// assert_eq!(ceil_div(1024, 512), 2);
/// assert_eq!(ceil_div(1025, 512), 3);
/// ```
#[inline]
#[must_use]
pub const fn ceil_div(value: u64, divisor: u64) -> u64 {
    value / divisor + (value % divisor != 0) as u64
}

/// Population count over a run of words.
#[inline]
#[must_use]
pub fn popcount_words(words: &[u64]) -> u64 {
    words.iter().map(|w| u64::from(w.count_ones())).sum()
}
