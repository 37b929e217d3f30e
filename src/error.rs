//! Error types for split-block filter construction.
//!
//! The filter itself never fails once built: inserts and queries are pure
//! arithmetic over storage the filter already owns. Every error in this module
//! is therefore a construction-time error.
//!
//! # Error Propagation
//!
//! ```
//! use splitbloom::{Result, SplitBlockError};
//! use splitbloom::core::params::{optimal_bit_count, optimal_hash_count};
//!
//! fn plan(n: u64, fp: f64) -> Result<(u64, u32)> {
//!     let m = optimal_bit_count(n, fp)?;
//!     let k = optimal_hash_count(m, n, 512);
//!     Ok((m, k))
//! }
//! # assert!(plan(1000, 0.01).is_ok());
//! # assert!(plan(1000, 1.5).is_err());
//! ```

#![allow(clippy::module_name_repetitions)]

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SplitBlockError>;

/// Errors that can occur while configuring or allocating a filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitBlockError {
    /// False positive probability outside the open interval (0, 1).
    #[error("False positive rate {fp_rate} is out of bounds. Must be in range (0, 1).")]
    FalsePositiveRateOutOfBounds {
        /// The rejected probability.
        fp_rate: f64,
    },

    /// Bits-per-key must be finite and strictly positive.
    #[error("Invalid bits per key: {bits_per_key}. Must be finite and greater than 0.")]
    InvalidBitsPerKey {
        /// The rejected value.
        bits_per_key: f64,
    },

    /// Hash count outside the supported range.
    #[error("Invalid hash count: {count}. Must be in range [{min}, {max}].")]
    InvalidHashCount {
        /// The rejected count.
        count: u32,
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
    },

    /// Parameters that are individually valid but produce an unusable filter.
    #[error("Invalid filter parameters: {message}.")]
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Backing storage could not be reserved.
    #[error("Failed to allocate {bytes} bytes of filter storage.")]
    AllocationFailed {
        /// Requested size in bytes.
        bytes: usize,
    },

    /// A backend was forced that this CPU cannot run.
    #[error("Block backend '{backend}' is not supported on this CPU.")]
    UnsupportedBackend {
        /// Name of the requested backend.
        backend: &'static str,
    },
}

impl SplitBlockError {
    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidBitsPerKey` error.
    #[must_use]
    pub fn invalid_bits_per_key(bits_per_key: f64) -> Self {
        Self::InvalidBitsPerKey { bits_per_key }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: u32, min: u32, max: u32) -> Self {
        Self::InvalidHashCount { count, min, max }
    }

    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use splitbloom::SplitBlockError;
    ///
    /// let err = SplitBlockError::invalid_parameters(format!("{} blocks overflow", u64::MAX));
    /// assert!(err.to_string().contains("overflow"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `AllocationFailed` error.
    #[must_use]
    pub fn allocation_failed(bytes: usize) -> Self {
        Self::AllocationFailed { bytes }
    }

    /// Create an `UnsupportedBackend` error.
    #[must_use]
    pub fn unsupported_backend(backend: &'static str) -> Self {
        Self::UnsupportedBackend { backend }
    }

    /// Whether the error came from caller-supplied parameters rather than
    /// the environment (allocation, CPU support).
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            Self::AllocationFailed { .. } | Self::UnsupportedBackend { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SplitBlockError::fp_rate_out_of_bounds(1.5);
        assert_eq!(
            err.to_string(),
            "False positive rate 1.5 is out of bounds. Must be in range (0, 1)."
        );

        let err = SplitBlockError::invalid_hash_count(40, 1, 32);
        assert_eq!(
            err.to_string(),
            "Invalid hash count: 40. Must be in range [1, 32]."
        );

        let err = SplitBlockError::allocation_failed(64);
        assert!(err.to_string().contains("64 bytes"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(SplitBlockError::invalid_bits_per_key(-1.0).is_configuration_error());
        assert!(SplitBlockError::invalid_parameters("x").is_configuration_error());
        assert!(!SplitBlockError::allocation_failed(1).is_configuration_error());
        assert!(!SplitBlockError::unsupported_backend("avx2").is_configuration_error());
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<SplitBlockError>();
    }

    #[test]
    fn test_clone_and_eq() {
        let err = SplitBlockError::invalid_hash_count(0, 1, 32);
        assert_eq!(err.clone(), err);
    }
}
