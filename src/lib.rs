//! # rsdb-utils
//!
//! Tooling for the **regime shift case study database** (RSDB): read and
//! write the database as CSV or Parquet, and validate every case study
//! against the RSDB JSON Schema.
//!
//! ## Key Features
//!
//! - **Two interchangeable formats** - CSV (nested cells as JSON text) and
//!   Parquet (nested cells as native list/struct columns), picked by suffix
//! - **Typed cells** - [`Cell`] is `Null`, a scalar, a list or a mapping, so
//!   a table read from either format compares equal
//! - **Schema checking** - Draft 2020-12 validation per row, with the row's
//!   errors written into `schema_errors` / `nb_schema_errors` columns
//! - **Non-fatal data problems** - malformed JSON cells and schema violations
//!   are collected as [`Warning`]s instead of aborting
//! - **Enum catalog** - the permitted values of every schema field, as a
//!   reference table
//!
//! ## Quick Start
//!
//! ```no_run
//! use rsdb_utils::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let schema = SchemaDocument::from_path("case_study_schema.json")?;
//! let validator = RsdbValidator::new(&schema)?;
//!
//! let mut warnings = WarningCollector::new();
//! let table = read_rsdb_with("rsdb.csv", &mut warnings)?;
//! let report = check_rsdb_with(table, &validator, &mut warnings);
//! println!("{} errors in {} rows", report.total_errors, report.rows_with_errors.len());
//!
//! write_rsdb(&report.table, "rsdb_checked.parquet")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `io-csv` - CSV driver
//! - `io-parquet` - Parquet driver (requires Arrow)
//! - `parallel` - [`check_rsdb_par`], row validation on the rayon pool
//!
//! ## Module Overview
//!
//! - [`cell`] / [`table`] - the in-memory database
//! - [`transcode`] - cell encoding between logical and stored form
//! - [`io`] - format dispatch and the CSV/Parquet drivers
//! - [`schema`] - schema loading and the record validator
//! - [`check`] - per-row validation and annotation
//! - [`enums`] - enum catalog generation
//! - [`warnings`] - the recoverable warning channel
//! - [`testing`] - fixtures and assertions

pub mod cell;
pub mod check;
pub mod enums;
pub mod error;
pub mod io;
pub mod schema;
pub mod table;
pub mod testing;
pub mod transcode;
pub mod warnings;

// General re-exports
pub use cell::Cell;
pub use check::{
    CheckReport, NB_SCHEMA_ERRORS_COLUMN, SCHEMA_ERRORS_COLUMN, check_rsdb, check_rsdb_with,
};
pub use enums::{EnumCatalog, generate_enum_catalog};
pub use error::RsdbError;
pub use io::{
    RsdbFormat, RsdbOptions, read_rsdb, read_rsdb_with, read_rsdb_with_options, write_rsdb,
    write_rsdb_with_options,
};
pub use schema::{RsdbValidator, SchemaDocument, Violation};
pub use table::{Column, Table};
pub use transcode::StorageFormat;
pub use warnings::{Warning, WarningCollector, WarningKind};

// Gated re-exports
#[cfg(feature = "parallel")]
pub use check::check_rsdb_par;

#[cfg(feature = "io-csv")]
pub use io::csv::{CsvOptions, read_csv_table, write_csv_table};

#[cfg(feature = "io-parquet")]
pub use io::parquet::{ParquetOptions, read_parquet_table, write_parquet_table};
