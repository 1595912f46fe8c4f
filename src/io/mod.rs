//! Reading and writing the database, with the format chosen by file suffix.
//!
//! - `.csv` (feature `io-csv`): delimited text, one header row, composite
//!   cells as JSON strings, NA markers for null.
//! - `.parquet` (feature `io-parquet`): columnar, nested values stored natively.
//!
//! Suffix matching is case-insensitive. Any other suffix fails with
//! [`RsdbError::UnsupportedFormat`] before a file is opened or created.
//!
//! ```no_run
//! use rsdb_utils::{read_rsdb, write_rsdb};
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = read_rsdb("rsdb.parquet")?;
//! write_rsdb(&table, "rsdb.csv")?;
//! # Ok(())
//! # }
//! ```

use crate::error::RsdbError;
use crate::table::Table;
use crate::transcode::StorageFormat;
use crate::warnings::WarningCollector;
use anyhow::Result;
use std::path::Path;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
pub mod arrow;

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
pub mod parquet;

/// Recognised database file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsdbFormat {
    Csv,
    Parquet,
}

impl RsdbFormat {
    /// Detect the format from the path suffix.
    ///
    /// # Errors
    /// Returns [`RsdbError::UnsupportedFormat`] if the suffix is neither
    /// `.csv` nor `.parquet`, or if the matching driver is compiled out.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy().to_lowercase();
        let format = if name.ends_with(".parquet") {
            RsdbFormat::Parquet
        } else if name.ends_with(".csv") {
            RsdbFormat::Csv
        } else {
            return Err(RsdbError::unsupported_format(
                path,
                "filename must end with .parquet or .csv",
            )
            .into());
        };
        if !format.is_enabled() {
            return Err(RsdbError::unsupported_format(
                path,
                format!("support for {} is not compiled in", format.extension()),
            )
            .into());
        }
        Ok(format)
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            RsdbFormat::Csv => ".csv",
            RsdbFormat::Parquet => ".parquet",
        }
    }

    /// How this format stores composite cells.
    #[must_use]
    pub fn storage(self) -> StorageFormat {
        match self {
            RsdbFormat::Csv => StorageFormat::Text,
            RsdbFormat::Parquet => StorageFormat::Columnar,
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            RsdbFormat::Csv => cfg!(feature = "io-csv"),
            RsdbFormat::Parquet => cfg!(feature = "io-parquet"),
        }
    }
}

/// Options for both drivers.
#[derive(Debug, Clone, Default)]
pub struct RsdbOptions {
    #[cfg(feature = "io-csv")]
    pub csv: self::csv::CsvOptions,
    #[cfg(feature = "io-parquet")]
    pub parquet: self::parquet::ParquetOptions,
}

/// Read a database file. Recoverable warnings are logged and dropped.
///
/// # Errors
/// See [`read_rsdb_with_options`].
pub fn read_rsdb(path: impl AsRef<Path>) -> Result<Table> {
    read_rsdb_with(path, &mut WarningCollector::new())
}

/// Read a database file, recording recoverable warnings in `warnings`.
///
/// # Errors
/// See [`read_rsdb_with_options`].
pub fn read_rsdb_with(path: impl AsRef<Path>, warnings: &mut WarningCollector) -> Result<Table> {
    read_rsdb_with_options(path, &RsdbOptions::default(), warnings)
}

/// Read a database file with explicit driver options.
///
/// # Errors
/// Returns [`RsdbError::UnsupportedFormat`] for an unknown suffix, or an I/O
/// or decoding error from the driver.
#[allow(unused_variables)]
pub fn read_rsdb_with_options(
    path: impl AsRef<Path>,
    opts: &RsdbOptions,
    warnings: &mut WarningCollector,
) -> Result<Table> {
    let path = path.as_ref();
    let format = RsdbFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, "reading database");
    let table = match format {
        #[cfg(feature = "io-csv")]
        RsdbFormat::Csv => self::csv::read_csv_table(path, &opts.csv, warnings)?,
        #[cfg(feature = "io-parquet")]
        RsdbFormat::Parquet => self::parquet::read_parquet_table(path, &opts.parquet)?,
        #[allow(unreachable_patterns)]
        _ => return Err(RsdbError::unsupported_format(path, "no driver compiled in").into()),
    };
    tracing::debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "database read"
    );
    Ok(table)
}

/// Write a database file. The caller's table is not modified.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// See [`write_rsdb_with_options`].
pub fn write_rsdb(table: &Table, path: impl AsRef<Path>) -> Result<usize> {
    write_rsdb_with_options(table, path, &RsdbOptions::default())
}

/// Write a database file with explicit driver options.
///
/// # Errors
/// Returns [`RsdbError::UnsupportedFormat`] for an unknown suffix (no file is
/// created), or an I/O or encoding error from the driver.
#[allow(unused_variables)]
pub fn write_rsdb_with_options(
    table: &Table,
    path: impl AsRef<Path>,
    opts: &RsdbOptions,
) -> Result<usize> {
    let path = path.as_ref();
    let format = RsdbFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, rows = table.num_rows(), "writing database");
    match format {
        #[cfg(feature = "io-csv")]
        RsdbFormat::Csv => self::csv::write_csv_table(table, path, &opts.csv),
        #[cfg(feature = "io-parquet")]
        RsdbFormat::Parquet => self::parquet::write_parquet_table(table, path, &opts.parquet),
        #[allow(unreachable_patterns)]
        _ => Err(RsdbError::unsupported_format(path, "no driver compiled in").into()),
    }
}
