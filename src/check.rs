//! Validate every row of the database against the case study schema.
//!
//! The checker never fails on bad data. Each violation is reported as a
//! [`Warning::SchemaViolation`], and the table comes back with two extra
//! columns:
//!
//! - `schema_errors`: the row's violation descriptions, each under a
//!   `####################` marker line, or `Null` for a valid row.
//! - `nb_schema_errors`: the row's violation count, or `Null` for a valid row.
//!
//! Columns the schema's top-level `properties` do not name are left out of
//! the validated record, so extension columns are never flagged.

use crate::cell::Cell;
use crate::schema::{RsdbValidator, Violation};
use crate::table::Table;
use crate::warnings::{Warning, WarningCollector};

pub const SCHEMA_ERRORS_COLUMN: &str = "schema_errors";
pub const NB_SCHEMA_ERRORS_COLUMN: &str = "nb_schema_errors";
pub const SECTION_MARKER: &str = "####################";

/// The annotated table and its error totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub table: Table,
    /// Violations across all rows.
    pub total_errors: usize,
    /// Indices of the rows with at least one violation, ascending.
    pub rows_with_errors: Vec<usize>,
}

impl CheckReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.total_errors == 0
    }
}

/// Check a table, logging warnings without keeping them.
#[must_use]
pub fn check_rsdb(table: Table, validator: &RsdbValidator) -> CheckReport {
    check_rsdb_with(table, validator, &mut WarningCollector::new())
}

/// Check a table, recording one warning per violation in `warnings`.
#[must_use]
pub fn check_rsdb_with(
    table: Table,
    validator: &RsdbValidator,
    warnings: &mut WarningCollector,
) -> CheckReport {
    let mut table = reset_annotations(table);
    let found: Vec<Vec<Violation>> = (0..table.num_rows())
        .map(|row| validator.violations(&validator.record(&table, row)))
        .collect();
    annotate(&mut table, found, warnings)
}

/// Like [`check_rsdb_with`], validating rows on the rayon pool.
///
/// Warnings and annotations are produced in row order afterwards, so the
/// result is identical to the sequential checker's.
#[cfg(feature = "parallel")]
#[must_use]
pub fn check_rsdb_par(
    table: Table,
    validator: &RsdbValidator,
    warnings: &mut WarningCollector,
) -> CheckReport {
    use rayon::prelude::*;

    let mut table = reset_annotations(table);
    let found: Vec<Vec<Violation>> = (0..table.num_rows())
        .into_par_iter()
        .map(|row| validator.violations(&validator.record(&table, row)))
        .collect();
    annotate(&mut table, found, warnings)
}

/// The `schema_errors` text for a row's violations.
#[must_use]
pub fn format_row_errors(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{SECTION_MARKER}\n{v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn reset_annotations(mut table: Table) -> Table {
    for name in [SCHEMA_ERRORS_COLUMN, NB_SCHEMA_ERRORS_COLUMN] {
        table.fill_column(name, Cell::Null);
    }
    table
}

fn annotate(
    table: &mut Table,
    found: Vec<Vec<Violation>>,
    warnings: &mut WarningCollector,
) -> CheckReport {
    let mut total_errors = 0;
    let mut rows_with_errors = Vec::new();
    for (row, violations) in found.into_iter().enumerate() {
        if violations.is_empty() {
            continue;
        }
        let text = format_row_errors(&violations);
        let count = violations.len();
        for violation in violations {
            warnings.push(Warning::SchemaViolation { row, violation });
        }
        table.set(row, SCHEMA_ERRORS_COLUMN, Cell::Str(text));
        table.set(row, NB_SCHEMA_ERRORS_COLUMN, Cell::Int(count as i64));
        total_errors += count;
        rows_with_errors.push(row);
    }
    tracing::info!(
        total_errors,
        rows = table.num_rows(),
        "{total_errors} errors when validating cases against the schema"
    );
    CheckReport {
        table: std::mem::take(table),
        total_errors,
        rows_with_errors,
    }
}
