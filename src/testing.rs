//! Testing utilities for code built on the database tooling.
//!
//! - **Fixtures**: a small case study schema and tables that follow it, one
//!   fully valid and one with known violations.
//! - **Assertions**: table comparison with cell-level failure messages.
//!
//! # Quick Start
//!
//! ```
//! use rsdb_utils::testing::*;
//! use rsdb_utils::{check_rsdb, RsdbValidator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let validator = RsdbValidator::new(&sample_schema()?)?;
//! let report = check_rsdb(sample_table_with_errors()?, &validator);
//! assert_eq!(report.total_errors, SAMPLE_ERROR_COUNT);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
