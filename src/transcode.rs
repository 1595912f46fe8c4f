//! Cell transcoding between the logical form and the on-disk form.
//!
//! Row-oriented text files cannot hold nested values, so lists and mappings
//! are stored there as compact JSON strings and parsed back on read. Columnar
//! files carry nested values natively and only need null normalisation.

use crate::cell::Cell;
use thiserror::Error;

/// How a file format stores composite cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    /// Delimited text: composites are JSON-encoded strings.
    Text,
    /// Columnar binary: composites are native nested values.
    Columnar,
}

impl StorageFormat {
    #[must_use]
    pub fn stores_composites_as_strings(self) -> bool {
        matches!(self, StorageFormat::Text)
    }
}

/// A text cell that looked like JSON but failed to parse.
///
/// Not fatal: the caller keeps [`raw`](Self::raw) as the cell value and
/// reports a warning.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct MalformedJsonCell {
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// `true` if the trimmed string opens with `[` or `{`. An unbalanced opener
/// such as `"[unterminated"` counts, and fails to parse.
#[must_use]
pub fn is_json_like(s: &str) -> bool {
    let t = s.trim_start();
    t.starts_with('[') || t.starts_with('{')
}

/// Encode a logical cell for storage.
#[must_use]
pub fn to_storage(cell: &Cell, format: StorageFormat) -> Cell {
    if format.stores_composites_as_strings() && cell.is_composite() {
        Cell::Str(cell.to_json_string())
    } else {
        cell.clone()
    }
}

/// Decode a stored cell into its logical form.
///
/// `raw` is [`Cell::Null`] when the driver saw a missing/NA marker. NaN
/// floats are missing values in both formats and decode to `Null`.
///
/// # Errors
/// For [`StorageFormat::Text`], a JSON-like string that fails to parse yields
/// [`MalformedJsonCell`] carrying the original string.
pub fn from_storage(raw: Cell, format: StorageFormat) -> Result<Cell, MalformedJsonCell> {
    match raw {
        Cell::Float(f) if f.is_nan() => Ok(Cell::Null),
        Cell::Str(s) if format.stores_composites_as_strings() && is_json_like(&s) => {
            match serde_json::from_str::<serde_json::Value>(s.trim()) {
                Ok(v) => Ok(Cell::from(v)),
                Err(source) => Err(MalformedJsonCell { raw: s, source }),
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composites_become_json_text_for_text_storage() {
        let cell = Cell::List(vec![Cell::map([("value", Cell::from("Eutrophication"))])]);
        assert_eq!(
            to_storage(&cell, StorageFormat::Text),
            Cell::from(r#"[{"value":"Eutrophication"}]"#)
        );
        assert_eq!(to_storage(&cell, StorageFormat::Columnar), cell);
    }

    #[test]
    fn scalars_pass_through_both_ways() {
        for fmt in [StorageFormat::Text, StorageFormat::Columnar] {
            assert_eq!(to_storage(&Cell::Int(3), fmt), Cell::Int(3));
            assert_eq!(from_storage(Cell::from("plain"), fmt).unwrap(), Cell::from("plain"));
        }
    }

    #[test]
    fn bracketed_text_is_parsed() {
        let decoded = from_storage(Cell::from(r#" {"a": [1, null]} "#), StorageFormat::Text).unwrap();
        assert_eq!(
            decoded,
            Cell::map([("a", Cell::List(vec![Cell::Int(1), Cell::Null]))])
        );
    }

    #[test]
    fn malformed_json_keeps_raw_string() {
        let err = from_storage(Cell::from("[unterminated"), StorageFormat::Text).unwrap_err();
        assert_eq!(err.raw, "[unterminated");

        let err = from_storage(Cell::from("[see notes]"), StorageFormat::Text).unwrap_err();
        assert_eq!(err.raw, "[see notes]");
    }

    #[test]
    fn malformed_cell_reports_the_parser_error() {
        let err = from_storage(Cell::from("{tbd}"), StorageFormat::Text).unwrap_err();
        assert_eq!(err.to_string(), err.source.to_string());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn brackets_inside_text_are_not_json() {
        assert!(!is_json_like("Lake Victoria [Kenya]"));
        assert!(is_json_like("  {\"a\": 1}"));
    }

    #[test]
    fn columnar_strings_are_never_parsed() {
        let raw = Cell::from("[1, 2]");
        assert_eq!(from_storage(raw.clone(), StorageFormat::Columnar).unwrap(), raw);
    }

    #[test]
    fn nan_is_missing() {
        assert_eq!(
            from_storage(Cell::Float(f64::NAN), StorageFormat::Columnar).unwrap(),
            Cell::Null
        );
    }
}
