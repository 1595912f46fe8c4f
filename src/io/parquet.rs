//! Parquet driver.
//!
//! Tables are written as a single record batch whose Arrow schema is inferred
//! from the cells (see [`crate::io::arrow`]); nested lists and mappings are
//! stored natively as list and struct columns. Reading walks the file batch by
//! batch and decodes every column back into cells.
//!
//! Files produced by dataframe libraries may carry a serialized row index as
//! an extra `__index_level_N__` column; it is not part of the database and is
//! skipped on read.

use crate::io::RsdbFormat;
use crate::io::arrow::{array_to_cells, table_to_record_batch};
use crate::table::{Column, Table};
use crate::transcode::{from_storage, to_storage};
use anyhow::{Context, Result, bail};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{File, create_dir_all};
use std::path::Path;

const INDEX_COLUMN_PREFIX: &str = "__index_level_";

/// Parquet reading/writing options.
#[derive(Debug, Clone)]
pub struct ParquetOptions {
    /// Rows per decoded batch when reading.
    pub batch_size: usize,
    /// Page compression when writing.
    pub compression: Compression,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            batch_size: 64 * 1024,
            compression: Compression::UNCOMPRESSED,
        }
    }
}

impl ParquetOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// Write a table to a Parquet file.
///
/// Internally:
/// 1. Infers an Arrow type per column from its cells.
/// 2. Converts the table into one `RecordBatch`.
/// 3. Writes the batch with `parquet::arrow::ArrowWriter`.
///
/// # Returns
/// Number of rows written.
///
/// # Errors
/// Returns [`crate::RsdbError::UnstorableColumn`] if a column mixes
/// incompatible cells, or an error if the table has no columns or file
/// creation/writing fails.
pub fn write_parquet_table(
    table: &Table,
    path: impl AsRef<Path>,
    opts: &ParquetOptions,
) -> Result<usize> {
    let path = path.as_ref();
    if table.num_columns() == 0 {
        bail!("cannot write a table without columns to {}", path.display());
    }
    let storage = RsdbFormat::Parquet.storage();
    let stored = table.map_cells(|c| to_storage(c, storage));
    let batch = table_to_record_batch(&stored)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(opts.compression)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).context("create ArrowWriter")?;
    writer.write(&batch).context("write batch to parquet")?;
    writer.close().context("close ArrowWriter")?;

    Ok(stored.num_rows())
}

/// Read a Parquet file into a table.
///
/// # Errors
/// Returns an error if the file cannot be opened, the reader cannot be built,
/// or batch iteration fails.
pub fn read_parquet_table(path: impl AsRef<Path>, opts: &ParquetOptions) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("open ParquetRecordBatchReader")?;
    let schema = builder.schema().clone();
    let mut reader = builder
        .with_batch_size(opts.batch_size)
        .build()
        .context("build ParquetRecordBatchReader")?;

    let storage = RsdbFormat::Parquet.storage();
    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();
    while let Some(batch) = reader.next().transpose().context("read next batch")? {
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            for cell in array_to_cells(array.as_ref())
                .with_context(|| format!("decode column `{}`", column.name))?
            {
                // columnar decoding never fails; only NaN normalisation applies
                column
                    .cells
                    .push(from_storage(cell, storage).unwrap_or_default());
            }
        }
    }

    columns.retain(|c| !c.name.starts_with(INDEX_COLUMN_PREFIX));
    Table::from_columns(columns)
}
