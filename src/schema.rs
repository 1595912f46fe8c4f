//! The case study JSON Schema and the record validator built from it.
//!
//! [`SchemaDocument`] holds the schema as supplied plus a copy with every
//! local `$ref` inlined (what the enum catalog walks). [`RsdbValidator`]
//! compiles the schema once with Draft 2020-12 semantics; it is immutable and
//! `Send + Sync`, so one instance can serve every caller.
//!
//! ```
//! use rsdb_utils::{RsdbValidator, SchemaDocument};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let doc = SchemaDocument::from_value(json!({
//!     "type": "object",
//!     "properties": { "case_study_name": { "type": "string" } },
//!     "required": ["case_study_name"]
//! }))?;
//! let validator = RsdbValidator::new(&doc)?;
//! assert!(validator.is_valid(&json!({ "case_study_name": "Balinese rice production" })));
//! assert_eq!(validator.violations(&json!({})).len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::RsdbError;
use crate::table::Table;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// An immutable JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    raw: Value,
    resolved: Value,
}

impl SchemaDocument {
    /// Load and dereference a schema file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load schema {}", path.display()))
    }

    /// Parse schema text.
    ///
    /// # Errors
    /// Returns an error if `text` is not JSON or not a JSON object.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text).context("parse schema JSON")?;
        Self::from_value(raw)
    }

    /// Wrap an already parsed schema.
    ///
    /// # Errors
    /// Returns [`RsdbError::Schema`] if `raw` is not a JSON object.
    pub fn from_value(raw: Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(RsdbError::Schema {
                message: "the schema document must be a JSON object".into(),
            }
            .into());
        }
        let resolved = dereference(&raw);
        Ok(Self { raw, resolved })
    }

    /// The schema exactly as supplied.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The schema with local references inlined.
    #[must_use]
    pub fn resolved(&self) -> &Value {
        &self.resolved
    }

    /// Top-level `properties` of the dereferenced schema.
    #[must_use]
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.resolved.get("properties")?.as_object()
    }

    /// Column names the schema recognises, in document order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties()
            .into_iter()
            .flat_map(|p| p.keys().map(String::as_str))
    }
}

/// Inline every local (`#...`) `$ref`, replacing the referring object with
/// the target. A reference that closes a cycle, or that points nowhere, is
/// left as is.
fn dereference(root: &Value) -> Value {
    let mut stack = Vec::new();
    resolve(root, root, &mut stack)
}

fn resolve(node: &Value, root: &Value, stack: &mut Vec<String>) -> Value {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref")
                && let Some(pointer) = reference.strip_prefix('#')
            {
                if stack.iter().any(|p| p == pointer) {
                    return node.clone();
                }
                let Some(target) = root.pointer(pointer) else {
                    return node.clone();
                };
                stack.push(pointer.to_string());
                let out = resolve(target, root, stack);
                stack.pop();
                return out;
            }
            Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), resolve(v, root, stack)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, root, stack)).collect()),
        other => other.clone(),
    }
}

/// One reported incompatibility between a record and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer into the record; empty for the record itself.
    pub instance_path: String,
    /// JSON pointer to the failing keyword in the schema.
    pub schema_path: String,
    pub message: String,
}

impl Violation {
    fn from_error(error: &jsonschema::ValidationError<'_>) -> Self {
        Self {
            instance_path: error.instance_path.to_string(),
            schema_path: error.schema_path.to_string(),
            message: error.to_string(),
        }
    }

    /// Top-level column the violation is about, if any.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.instance_path
            .strip_prefix('/')
            .map(|p| p.split('/').next().unwrap_or(p))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance = if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        };
        write!(
            f,
            "{}\n\nFailed validating at {}\n\nOn instance at {}",
            self.message, self.schema_path, instance
        )
    }
}

/// Draft 2020-12 validator for case study records.
pub struct RsdbValidator {
    validator: jsonschema::Validator,
    properties: HashSet<String>,
}

impl RsdbValidator {
    /// Compile the schema.
    ///
    /// # Errors
    /// Returns [`RsdbError::Schema`] if the document does not validate against
    /// the Draft 2020-12 meta-schema.
    pub fn new(doc: &SchemaDocument) -> Result<Self> {
        let validator = jsonschema::draft202012::new(doc.raw()).map_err(|e| RsdbError::Schema {
            message: e.to_string(),
        })?;
        let properties = doc.property_names().map(str::to_string).collect();
        Ok(Self {
            validator,
            properties,
        })
    }

    #[must_use]
    pub fn is_valid(&self, record: &Value) -> bool {
        self.validator.is_valid(record)
    }

    /// Every violation in `record`, in the order the engine reports them.
    #[must_use]
    pub fn violations(&self, record: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(record)
            .map(|e| Violation::from_error(&e))
            .collect()
    }

    /// Whether `column` is one of the schema's top-level properties.
    #[must_use]
    pub fn recognizes(&self, column: &str) -> bool {
        self.properties.contains(column)
    }

    /// One table row as a record, restricted to the columns the schema names.
    #[must_use]
    pub fn record(&self, table: &Table, row: usize) -> Value {
        Value::Object(
            table
                .row(row)
                .filter(|(name, _)| self.recognizes(name))
                .map(|(name, cell)| (name.to_string(), cell.to_json()))
                .collect(),
        )
    }
}

impl fmt::Debug for RsdbValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsdbValidator")
            .field("properties", &self.properties.len())
            .finish_non_exhaustive()
    }
}
