//! Assertion functions for comparing tables.

use crate::cell::Cell;
use crate::table::Table;

/// Assert that two tables have the same columns, in order, and equal cells.
///
/// # Panics
///
/// Panics naming the first differing column or cell.
///
/// # Example
///
/// ```
/// use rsdb_utils::testing::assert_tables_equal;
/// use rsdb_utils::{Cell, Table};
///
/// let t = Table::new().with_column("a", vec![Cell::Int(1)]).unwrap();
/// assert_tables_equal(&t, &t.clone());
/// ```
pub fn assert_tables_equal(actual: &Table, expected: &Table) {
    let a: Vec<&str> = actual.column_names().collect();
    let e: Vec<&str> = expected.column_names().collect();
    assert_eq!(
        a, e,
        "Column mismatch:\n  Expected: {e:?}\n  Actual: {a:?}"
    );
    assert_eq!(
        actual.num_rows(),
        expected.num_rows(),
        "Row count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.num_rows(),
        actual.num_rows()
    );
    for (ac, ec) in actual.columns().iter().zip(expected.columns()) {
        for (row, (a, e)) in ac.cells.iter().zip(&ec.cells).enumerate() {
            assert_eq!(
                a, e,
                "Cell mismatch at row {row}, column `{}`:\n  Expected: {e:?}\n  Actual: {a:?}",
                ac.name
            );
        }
    }
}

/// Assert that a column holds exactly `expected`.
///
/// # Panics
///
/// Panics if the column is missing or differs.
pub fn assert_column_equal(table: &Table, column: &str, expected: &[Cell]) {
    let Some(actual) = table.column(column) else {
        panic!(
            "Missing column `{column}`; table has {:?}",
            table.column_names().collect::<Vec<_>>()
        );
    };
    assert_eq!(
        actual, expected,
        "Column `{column}` mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Sum of the integer cells of a column, ignoring `Null`.
#[must_use]
pub fn column_sum(table: &Table, column: &str) -> i64 {
    table
        .column(column)
        .map_or(0, |cells| cells.iter().filter_map(Cell::as_i64).sum())
}
