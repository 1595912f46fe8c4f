//! Permitted values per schema field, as a reference fixture.
//!
//! The catalog walks the top-level `properties` of the dereferenced schema.
//! Composition is flattened first: the first branch of an `allOf` is hoisted
//! into its parent, repeatedly and at every depth. Each field then yields:
//!
//! | field shape | options |
//! | --- | --- |
//! | scalar with `enum` | the literals |
//! | scalar without `enum` | none |
//! | array of strings with item `enum` | each literal wrapped in a one-element list |
//! | array of objects, no sub-property `enum` | one template: `[{key: "" or null, ...}]` |
//! | array of objects, one `enum` on `value` | `[{"value": literal}]` per literal |
//! | array of objects, several `enum`s | [`RsdbError::UnsupportedSchemaShape`] |
//!
//! In templates, numeric sub-properties are `null` and all others `""`. The
//! literal `"Proposed & new type"` also carries an empty `other` key, where the
//! proposed type is described.

use crate::cell::Cell;
use crate::error::RsdbError;
use crate::schema::SchemaDocument;
use crate::table::{Column, Table};
use anyhow::Result;
use serde_json::{Map, Value};

/// The `value` literal that asks for a free-text `other` description.
pub const PROPOSED_NEW_TYPE: &str = "Proposed & new type";

/// Field name → permitted options, in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumCatalog {
    entries: Vec<(String, Option<Vec<Cell>>)>,
}

impl EnumCatalog {
    /// Options for `field`, or `None` if the field is unknown or has no
    /// enumerable constraint.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[Cell]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, opts)| opts.as_deref())
    }

    /// Every schema field, including those without options.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[Cell]>)> {
        self.entries
            .iter()
            .map(|(name, opts)| (name.as_str(), opts.as_deref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One column per field, one row per option, shorter columns padded
    /// with `Null`.
    ///
    /// # Errors
    /// Never fails in practice; columns are padded to equal length.
    pub fn to_table(&self) -> Result<Table> {
        let rows = self
            .entries
            .iter()
            .filter_map(|(_, opts)| opts.as_ref().map(Vec::len))
            .max()
            .unwrap_or(0);
        let columns = self
            .entries
            .iter()
            .map(|(name, opts)| {
                let mut cells = opts.clone().unwrap_or_default();
                cells.resize(rows, Cell::Null);
                Column::new(name.clone(), cells)
            })
            .collect();
        Table::from_columns(columns)
    }
}

/// Build the catalog for a schema.
///
/// # Errors
/// Returns [`RsdbError::Schema`] if the schema has no top-level `properties`,
/// or [`RsdbError::UnsupportedSchemaShape`] for an array-of-object field with
/// more than one enumerated sub-property, or whose single one is not `value`.
pub fn generate_enum_catalog(doc: &SchemaDocument) -> Result<EnumCatalog> {
    let properties = doc.properties().ok_or_else(|| RsdbError::Schema {
        message: "the schema has no top-level properties".into(),
    })?;
    let mut entries = Vec::with_capacity(properties.len());
    for (name, field) in properties {
        let mut field = field.clone();
        hoist_all_of(&mut field);
        entries.push((name.clone(), field_options(name, &field)?));
    }
    Ok(EnumCatalog { entries })
}

fn hoist_all_of(node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };
    while let Some(all_of) = map.remove("allOf") {
        if let Value::Array(branches) = all_of
            && let Some(Value::Object(first)) = branches.into_iter().next()
        {
            map.extend(first);
        }
    }
    for v in map.values_mut() {
        hoist_all_of(v);
    }
}

fn has_type(schema: &Value, ty: &str) -> bool {
    match schema.get("type") {
        Some(Value::String(s)) => s == ty,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(ty)),
        _ => false,
    }
}

fn is_numeric(schema: &Value) -> bool {
    has_type(schema, "number") || has_type(schema, "integer")
}

fn enum_literals(schema: &Value) -> Option<&Vec<Value>> {
    schema.get("enum")?.as_array()
}

fn field_options(name: &str, field: &Value) -> Result<Option<Vec<Cell>>> {
    if has_type(field, "string") || is_numeric(field) {
        return Ok(enum_literals(field).map(|vals| vals.iter().cloned().map(Cell::from).collect()));
    }
    if !has_type(field, "array") {
        return Ok(None);
    }
    let Some(items) = field.get("items") else {
        return Ok(None);
    };
    if has_type(items, "string") {
        return Ok(enum_literals(items).map(|vals| {
            vals.iter()
                .map(|v| Cell::List(vec![Cell::from(v.clone())]))
                .collect()
        }));
    }
    let Some(sub) = items.get("properties").and_then(Value::as_object) else {
        return Ok(None);
    };
    match sub.values().filter(|p| p.get("enum").is_some()).count() {
        0 => Ok(Some(vec![Cell::List(vec![template(sub)])])),
        1 => {
            let literals = sub
                .get("value")
                .and_then(enum_literals)
                .ok_or_else(|| {
                    RsdbError::shape(
                        name,
                        "only lists of objects enumerating a `value` key are supported",
                    )
                })?;
            Ok(Some(literals.iter().map(value_option).collect()))
        }
        _ => Err(RsdbError::shape(name, "multiple enums in the same field are not supported").into()),
    }
}

fn template(sub: &Map<String, Value>) -> Cell {
    Cell::map(sub.iter().map(|(k, p)| {
        let placeholder = if is_numeric(p) {
            Cell::Null
        } else {
            Cell::from("")
        };
        (k.clone(), placeholder)
    }))
}

fn value_option(literal: &Value) -> Cell {
    let mut entry = vec![("value", Cell::from(literal.clone()))];
    if literal.as_str() == Some(PROPOSED_NEW_TYPE) {
        entry.push(("other", Cell::from("")));
    }
    Cell::List(vec![Cell::map(entry)])
}
