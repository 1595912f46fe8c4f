//! Recoverable conditions and the collector that accumulates them.
//!
//! Malformed JSON cells and per-row schema violations never abort a read or a
//! check. Each one becomes a [`Warning`], is logged through `tracing` at
//! `WARN`, and is kept in a [`WarningCollector`] so callers and tests can
//! inspect what happened.
//!
//! ```
//! use rsdb_utils::warnings::{Warning, WarningCollector, WarningKind};
//!
//! let mut warnings = WarningCollector::new();
//! warnings.push(Warning::MalformedJsonCell {
//!     column: "notes".into(),
//!     row: 4,
//!     value: "[unterminated".into(),
//!     message: "EOF while parsing a list".into(),
//! });
//! assert_eq!(warnings.count(WarningKind::MalformedJsonCell), 1);
//! ```

use crate::schema::Violation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fmt, io};

/// A single recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A text cell opened like JSON but did not parse; the raw string was kept.
    MalformedJsonCell {
        column: String,
        row: usize,
        value: String,
        message: String,
    },
    /// A row does not comply with the schema.
    SchemaViolation { row: usize, violation: Violation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    MalformedJsonCell,
    SchemaViolation,
}

impl Warning {
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        match self {
            Warning::MalformedJsonCell { .. } => WarningKind::MalformedJsonCell,
            Warning::SchemaViolation { .. } => WarningKind::SchemaViolation,
        }
    }

    #[must_use]
    pub fn row(&self) -> usize {
        match self {
            Warning::MalformedJsonCell { row, .. } | Warning::SchemaViolation { row, .. } => *row,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedJsonCell {
                column,
                row,
                value,
                message,
            } => write!(
                f,
                "Cell inferred as JSON type but error while loading JSON content, please check \
                 for syntax errors ({message}).\nColumn `{column}`, row {row}.\nCell value: {value}"
            ),
            Warning::SchemaViolation { row, violation } => write!(
                f,
                "\n### Row {row} ########################################\n\
                 Database does not comply with the JSON schema:\n{violation}"
            ),
        }
    }
}

/// Accumulates warnings in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Vec<Warning>,
}

impl WarningCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a warning.
    pub fn push(&mut self, warning: Warning) {
        match &warning {
            Warning::MalformedJsonCell { column, row, .. } => {
                tracing::warn!(column = %column, row = *row, "{warning}");
            }
            Warning::SchemaViolation { row, violation } => {
                tracing::warn!(row = *row, path = %violation.instance_path, "{warning}");
            }
        }
        self.warnings.push(warning);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of warnings of one kind.
    #[must_use]
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind() == kind).count()
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.warnings.iter()
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }

    /// Print all warnings to stderr.
    pub fn print_warnings(&self) {
        for w in &self.warnings {
            eprintln!("{w}");
        }
    }

    /// Export warnings as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.warnings)
    }

    /// Write warnings to a file in JSON format.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl<'a> IntoIterator for &'a WarningCollector {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}

impl fmt::Display for WarningCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WarningCollector({} warnings)", self.len())
    }
}
