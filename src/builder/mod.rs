//! Fluent construction of split-block filters.
//!
//! Builders use the type-state pattern: forgetting the key count or the
//! sizing mode is a compile error, while out-of-range values are reported by
//! `build()`.
//!
//! # Examples
//!
//! ```
//! use splitbloom::builder::SplitBlockFilterBuilder;
//!
//! let mut filter = SplitBlockFilterBuilder::new()
//!     .expected_keys(10_000)
//!     .false_positive_rate(0.01)
//!     .build()?;
//!
//! filter.insert_key(b"alice");
//! assert!(filter.contains_key(b"alice"));
//! # Ok::<(), splitbloom::SplitBlockError>(())
//! ```
//!
//! ```compile_fail
//! use splitbloom::builder::SplitBlockFilterBuilder;
//!
//! // No sizing mode: `build` does not exist in this state.
//! let filter = SplitBlockFilterBuilder::new().expected_keys(10).build();
//! ```

pub mod split_block;

pub use split_block::SplitBlockFilterBuilder;
