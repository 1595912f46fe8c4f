//! Fatal error kinds.
//!
//! Public operations return [`anyhow::Result`] and attach context strings to
//! I/O and codec failures. The structural failures below are the root cause
//! of the returned error when they occur, so callers can recover the kind:
//!
//! ```
//! use rsdb_utils::{read_rsdb, RsdbError};
//!
//! let err = read_rsdb("cases.txt").unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<RsdbError>(),
//!     Some(RsdbError::UnsupportedFormat { .. })
//! ));
//! ```
//!
//! Data-quality problems (malformed JSON cells, schema violations) are never
//! errors; they go through [`crate::warnings`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RsdbError {
    /// The path suffix matches no known format, or the format is compiled out.
    #[error("unsupported database format for `{path}`: {reason}")]
    UnsupportedFormat { path: String, reason: String },

    /// The schema document is not itself a valid JSON Schema.
    #[error("invalid JSON schema: {message}")]
    Schema { message: String },

    /// The enum catalog cannot represent a field of this shape.
    #[error("unsupported schema shape for field `{field}`: {reason}")]
    UnsupportedSchemaShape { field: String, reason: String },

    /// The cells of a column cannot share a single columnar type.
    #[error("column `{column}` cannot be stored in a columnar file: {reason}")]
    UnstorableColumn { column: String, reason: String },

    /// Two columns share a name.
    #[error("duplicate column `{column}`")]
    DuplicateColumn { column: String },

    /// A column was added with a row count differing from the table's.
    #[error("column `{column}` has {actual} rows, expected {expected}")]
    RaggedTable {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl RsdbError {
    pub(crate) fn unsupported_format(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(field: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedSchemaShape {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
