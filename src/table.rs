//! The in-memory database: ordered, named, equal-length columns of [`Cell`]s.
//!
//! One row is one case study. Column order and row order are significant and
//! are preserved by both format drivers.

use crate::cell::Cell;
use crate::error::RsdbError;
use anyhow::Result;
use serde_json::{Map, Value};

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// An ordered collection of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns, checking they all have the same length.
    ///
    /// # Errors
    /// Returns [`RsdbError::RaggedTable`] on a length mismatch, or
    /// [`RsdbError::DuplicateColumn`] if two columns share a name.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for c in columns {
            table.push_column(c.name, c.cells)?;
        }
        Ok(table)
    }

    /// Builder-style [`push_column`](Self::push_column).
    ///
    /// # Errors
    /// See [`push_column`](Self::push_column).
    pub fn with_column(mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<Self> {
        self.push_column(name, cells)?;
        Ok(self)
    }

    /// Append a column.
    ///
    /// # Errors
    /// Returns [`RsdbError::DuplicateColumn`] if the name is taken, or
    /// [`RsdbError::RaggedTable`] if the table already has columns and
    /// `cells.len()` differs from [`num_rows`](Self::num_rows).
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(RsdbError::DuplicateColumn { column: name }.into());
        }
        if !self.columns.is_empty() && cells.len() != self.num_rows() {
            return Err(RsdbError::RaggedTable {
                column: name,
                expected: self.num_rows(),
                actual: cells.len(),
            }
            .into());
        }
        self.columns.push(Column { name, cells });
        Ok(())
    }

    /// Set every cell of `name` to `cell`, appending the column if missing.
    pub(crate) fn fill_column(&mut self, name: &str, cell: Cell) {
        let n = self.num_rows();
        match self.column_mut(name) {
            Some(cells) => cells.fill(cell),
            None => self.columns.push(Column::new(name, vec![cell; n])),
        }
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Remove a column by name, returning it if present.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let i = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(i))
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Cell>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.cells)
    }

    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column)?.get(row)
    }

    /// Overwrite a single cell. Returns `false` if the cell does not exist.
    pub fn set(&mut self, row: usize, column: &str, cell: Cell) -> bool {
        match self.column_mut(column).and_then(|c| c.get_mut(row)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// `(column name, cell)` pairs of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns
            .iter()
            .filter_map(move |c| c.cells.get(row).map(|cell| (c.name.as_str(), cell)))
    }

    /// One row as a JSON object keyed by column name.
    #[must_use]
    pub fn record(&self, row: usize) -> Map<String, Value> {
        self.row(row)
            .map(|(name, cell)| (name.to_string(), cell.to_json()))
            .collect()
    }

    /// A copy of the table with `f` applied to every cell.
    #[must_use]
    pub fn map_cells(&self, mut f: impl FnMut(&Cell) -> Cell) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    cells: c.cells.iter().map(&mut f).collect(),
                })
                .collect(),
        }
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
