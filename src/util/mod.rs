//! Internal utility functions and helpers.
//!
//! - [`bitops`] - Bit manipulation used by sizing and storage

pub mod bitops;

pub use bitops::{ceil_div, is_power_of_two, next_power_of_two};
