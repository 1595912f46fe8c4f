//! CSV driver.
//!
//! # Design notes
//! - One header row; column order and row order are kept as stored.
//! - Composite cells are compact JSON strings. A field that opens with `[` or
//!   `{` is parsed back; if parsing fails the raw text is kept and a
//!   [`Warning::MalformedJsonCell`] is recorded.
//! - Fields equal to one of [`CsvOptions::na_values`] decode to `Null`.
//! - CSV is untyped, so each column's plain scalars are typed together: all
//!   integers, else all floats, else all booleans, else strings. Floats are
//!   always written with a fraction or exponent so they come back as floats.

use crate::cell::Cell;
use crate::io::RsdbFormat;
use crate::table::{Column, Table};
use crate::transcode::{from_storage, is_json_like, to_storage};
use crate::warnings::{Warning, WarningCollector};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{File, create_dir_all};
use std::path::Path;

/// CSV reading/writing options.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Field values read as `Null`.
    pub na_values: Vec<String>,
    /// Text written for `Null`.
    pub null_repr: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: vec![String::new(), "NA".into(), "NaN".into()],
            null_repr: String::new(),
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn null_repr(mut self, repr: impl Into<String>) -> Self {
        self.null_repr = repr.into();
        self
    }

    fn is_na(&self, field: &str) -> bool {
        self.na_values.iter().any(|na| na == field)
    }
}

/// Read a CSV database file.
///
/// # Errors
/// Returns an error if the file cannot be opened, the header cannot be read,
/// or a record has a different field count than the header.
pub fn read_csv_table(
    path: impl AsRef<Path>,
    opts: &CsvOptions,
    warnings: &mut WarningCollector,
) -> Result<Table> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(opts.delimiter)
        .from_reader(f);
    let headers = rdr
        .headers()
        .with_context(|| format!("read CSV header of {}", path.display()))?
        .clone();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        for (j, field) in rec.iter().enumerate() {
            raw[j].push(field.to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, fields)| Column::new(name, decode_column(name, fields, opts, warnings)))
        .collect();
    Table::from_columns(columns)
}

/// Write a table to a CSV file, creating parent directories as needed.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or a row fails to
/// write.
pub fn write_csv_table(table: &Table, path: impl AsRef<Path>, opts: &CsvOptions) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let storage = RsdbFormat::Csv.storage();
    let stored = table.map_cells(|c| to_storage(c, storage));

    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut wtr = WriterBuilder::new().delimiter(opts.delimiter).from_writer(f);
    if stored.num_columns() > 0 {
        wtr.write_record(stored.column_names())
            .context("write CSV header")?;
    }
    for row in 0..stored.num_rows() {
        let fields: Vec<String> = stored.row(row).map(|(_, c)| render(c, opts)).collect();
        wtr.write_record(&fields)
            .with_context(|| format!("write CSV row #{}", row + 1))?;
    }
    wtr.flush()?;
    Ok(stored.num_rows())
}

fn render(cell: &Cell, opts: &CsvOptions) -> String {
    match cell {
        Cell::Null => opts.null_repr.clone(),
        other => other.to_string(),
    }
}

fn decode_column(
    name: &str,
    fields: Vec<String>,
    opts: &CsvOptions,
    warnings: &mut WarningCollector,
) -> Vec<Cell> {
    let storage = RsdbFormat::Csv.storage();
    let mut cells = Vec::with_capacity(fields.len());
    let mut scalars = Vec::new();
    for (row, field) in fields.into_iter().enumerate() {
        if opts.is_na(&field) {
            cells.push(Cell::Null);
        } else if is_json_like(&field) {
            match from_storage(Cell::Str(field), storage) {
                Ok(cell) => cells.push(cell),
                Err(bad) => {
                    warnings.push(Warning::MalformedJsonCell {
                        column: name.to_string(),
                        row,
                        value: bad.raw.clone(),
                        message: bad.source.to_string(),
                    });
                    cells.push(Cell::Str(bad.raw));
                }
            }
        } else {
            scalars.push(row);
            cells.push(Cell::Str(field));
        }
    }

    let kind = ScalarKind::infer(scalars.iter().filter_map(|&i| cells[i].as_str()));
    if kind != ScalarKind::Str {
        for i in scalars {
            let typed = cells[i].as_str().map(|s| kind.parse(s));
            if let Some(cell) = typed {
                cells[i] = cell;
            }
        }
    }
    cells
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Int,
    Float,
    Bool,
    Str,
}

impl ScalarKind {
    fn infer<'a>(values: impl Iterator<Item = &'a str> + Clone) -> Self {
        if values.clone().next().is_none() {
            return ScalarKind::Str;
        }
        if values.clone().all(|v| v.parse::<i64>().is_ok()) {
            ScalarKind::Int
        } else if values.clone().all(|v| v.parse::<f64>().is_ok()) {
            ScalarKind::Float
        } else if values.clone().all(|v| parse_bool(v).is_some()) {
            ScalarKind::Bool
        } else {
            ScalarKind::Str
        }
    }

    fn parse(self, s: &str) -> Cell {
        let parsed = match self {
            ScalarKind::Int => s.parse().ok().map(Cell::Int),
            ScalarKind::Float => s.parse().ok().map(Cell::Float),
            ScalarKind::Bool => parse_bool(s).map(Cell::Bool),
            ScalarKind::Str => None,
        };
        // NaN parses as a float but is a missing value
        match parsed {
            Some(cell) => from_storage(cell, RsdbFormat::Csv.storage())
                .unwrap_or_else(|_| Cell::Str(s.to_string())),
            None => Cell::Str(s.to_string()),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(fields: &[&str]) -> (Vec<Cell>, WarningCollector) {
        let mut w = WarningCollector::new();
        let cells = decode_column(
            "c",
            fields.iter().map(|s| s.to_string()).collect(),
            &CsvOptions::default(),
            &mut w,
        );
        (cells, w)
    }

    #[test]
    fn integer_column_with_gaps() {
        let (cells, _) = decode(&["1", "", "3"]);
        assert_eq!(cells, vec![Cell::Int(1), Cell::Null, Cell::Int(3)]);
    }

    #[test]
    fn mixed_numbers_become_floats() {
        let (cells, _) = decode(&["1", "2.5"]);
        assert_eq!(cells, vec![Cell::Float(1.0), Cell::Float(2.5)]);
    }

    #[test]
    fn any_text_makes_the_column_strings() {
        let (cells, _) = decode(&["1990", "unknown"]);
        assert_eq!(cells, vec![Cell::from("1990"), Cell::from("unknown")]);
    }

    #[test]
    fn booleans_in_any_case() {
        let (cells, _) = decode(&["True", "false", "NA"]);
        assert_eq!(cells, vec![Cell::Bool(true), Cell::Bool(false), Cell::Null]);
    }

    #[test]
    fn json_cells_are_typed_individually() {
        let (cells, w) = decode(&[r#"["Coastal"]"#, "12", "[broken"]);
        assert_eq!(
            cells,
            vec![
                Cell::List(vec![Cell::from("Coastal")]),
                Cell::Int(12),
                Cell::from("[broken"),
            ]
        );
        assert_eq!(w.len(), 1);
        assert_eq!(w.warnings()[0].row(), 2);
    }

    #[test]
    fn float_rendering_keeps_the_fraction() {
        let opts = CsvOptions::default();
        assert_eq!(render(&Cell::Float(3.0), &opts), "3.0");
        assert_eq!(render(&Cell::Null, &opts.clone().null_repr("NA")), "NA");
    }
}
