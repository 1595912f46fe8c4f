//! Conversion between [`Cell`] columns and Arrow arrays.
//!
//! Writing infers one Arrow type per column by merging the shapes of its
//! cells: `Null` merges with anything, integers widen to floats, list element
//! types merge, and struct fields are unioned. Any other combination cannot
//! share a column and is rejected with [`RsdbError::UnstorableColumn`].
//!
//! When the mappings of a struct do not all carry the same keys, the struct
//! gets one more child, `__absent_keys__`: per row, the list of union keys the
//! mapping did not have. Reading removes those keys again, so a missing key and
//! a key holding `null` stay distinct. A column or field that never
//! holds a value is stored as all-null strings.
//!
//! Reading accepts the common Arrow types a Parquet file may carry, including
//! ones this crate never writes (narrow integers, large/view strings, large and
//! fixed-size lists). Unknown types are rendered to their display string.

use crate::cell::{Cell, NULL_CELL};
use crate::error::RsdbError;
use crate::table::Table;
use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, ListArray, StringArray,
    StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{
    DataType, Field, Fields, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
    Schema, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Struct child naming the keys a row's mapping lacked.
pub const ABSENT_KEYS_FIELD: &str = "__absent_keys__";

/// The columnar shape of a cell or column.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List(Box<Shape>),
    /// Fields, and whether some mapping lacked one of them.
    Struct(BTreeMap<String, Shape>, bool),
}

impl Shape {
    fn of(cell: &Cell) -> Option<Shape> {
        Some(match cell {
            Cell::Null => Shape::Null,
            Cell::Bool(_) => Shape::Bool,
            Cell::Int(_) => Shape::Int,
            Cell::Float(_) => Shape::Float,
            Cell::Str(_) => Shape::Str,
            Cell::List(items) => {
                let mut inner = Shape::Null;
                for item in items {
                    inner = inner.merge(Shape::of(item)?)?;
                }
                Shape::List(Box::new(inner))
            }
            Cell::Map(m) => {
                let mut fields = BTreeMap::new();
                for (k, v) in m {
                    if k == ABSENT_KEYS_FIELD {
                        return None;
                    }
                    fields.insert(k.clone(), Shape::of(v)?);
                }
                Shape::Struct(fields, false)
            }
        })
    }

    fn merge(self, other: Shape) -> Option<Shape> {
        Some(match (self, other) {
            (Shape::Null, s) | (s, Shape::Null) => s,
            (Shape::Int, Shape::Float) | (Shape::Float, Shape::Int) => Shape::Float,
            (Shape::List(a), Shape::List(b)) => Shape::List(Box::new(a.merge(*b)?)),
            (Shape::Struct(mut a, partial_a), Shape::Struct(b, partial_b)) => {
                let partial = partial_a || partial_b || !a.keys().eq(b.keys());
                for (k, s) in b {
                    let merged = match a.remove(&k) {
                        Some(prev) => prev.merge(s)?,
                        None => s,
                    };
                    a.insert(k, merged);
                }
                Shape::Struct(a, partial)
            }
            (a, b) if a == b => a,
            _ => return None,
        })
    }

    fn has_empty_struct(&self) -> bool {
        match self {
            Shape::Struct(fields, _) => {
                fields.is_empty() || fields.values().any(Shape::has_empty_struct)
            }
            Shape::List(inner) => inner.has_empty_struct(),
            _ => false,
        }
    }
}

fn infer_shape(column: &str, cells: &[Cell]) -> Result<Shape> {
    let mut shape = Shape::Null;
    for (row, cell) in cells.iter().enumerate() {
        let merged = Shape::of(cell).and_then(|s| shape.clone().merge(s));
        shape = merged.ok_or_else(|| RsdbError::UnstorableColumn {
            column: column.to_string(),
            reason: format!("row {row} holds a {} incompatible with earlier rows", cell.kind()),
        })?;
    }
    if shape.has_empty_struct() {
        return Err(RsdbError::UnstorableColumn {
            column: column.to_string(),
            reason: "mappings without keys have no columnar representation".into(),
        }
        .into());
    }
    Ok(shape)
}

fn build_array(shape: &Shape, cells: &[&Cell]) -> Result<ArrayRef> {
    Ok(match shape {
        Shape::Null => Arc::new(StringArray::new_null(cells.len())),
        Shape::Bool => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        Shape::Int => Arc::new(Int64Array::from(
            cells.iter().map(|c| c.as_i64()).collect::<Vec<_>>(),
        )),
        Shape::Float => Arc::new(Float64Array::from(
            cells.iter().map(|c| c.as_f64()).collect::<Vec<_>>(),
        )),
        Shape::Str => Arc::new(StringArray::from(
            cells.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        )),
        Shape::List(inner) => {
            let mut lengths = Vec::with_capacity(cells.len());
            let mut valid = Vec::with_capacity(cells.len());
            let mut children: Vec<&Cell> = Vec::new();
            for c in cells {
                match c {
                    Cell::List(items) => {
                        lengths.push(items.len());
                        valid.push(true);
                        children.extend(items.iter());
                    }
                    _ => {
                        lengths.push(0);
                        valid.push(false);
                    }
                }
            }
            let values = build_array(inner, &children)?;
            let field = Arc::new(Field::new_list_field(values.data_type().clone(), true));
            Arc::new(
                ListArray::try_new(
                    field,
                    OffsetBuffer::from_lengths(lengths),
                    values,
                    Some(NullBuffer::from(valid)),
                )
                .context("assemble list array")?,
            )
        }
        Shape::Struct(fields, partial) => {
            let valid: Vec<bool> = cells.iter().map(|c| matches!(c, Cell::Map(_))).collect();
            let mut arrow_fields = Vec::with_capacity(fields.len() + 1);
            let mut arrays = Vec::with_capacity(fields.len() + 1);
            for (name, child_shape) in fields {
                let child: Vec<&Cell> = cells
                    .iter()
                    .map(|c| match c {
                        Cell::Map(m) => m.get(name).unwrap_or(&NULL_CELL),
                        _ => &NULL_CELL,
                    })
                    .collect();
                let array = build_array(child_shape, &child)?;
                arrow_fields.push(Field::new(name, array.data_type().clone(), true));
                arrays.push(array);
            }
            if *partial {
                let absent: Vec<Cell> = cells
                    .iter()
                    .map(|c| match c {
                        Cell::Map(m) => Cell::List(
                            fields
                                .keys()
                                .filter(|k| !m.contains_key(*k))
                                .map(|k| Cell::Str(k.clone()))
                                .collect(),
                        ),
                        _ => Cell::Null,
                    })
                    .collect();
                let refs: Vec<&Cell> = absent.iter().collect();
                let array = build_array(&Shape::List(Box::new(Shape::Str)), &refs)?;
                arrow_fields.push(Field::new(ABSENT_KEYS_FIELD, array.data_type().clone(), true));
                arrays.push(array);
            }
            Arc::new(
                StructArray::try_new(Fields::from(arrow_fields), arrays, Some(NullBuffer::from(valid)))
                    .context("assemble struct array")?,
            )
        }
    })
}

/// Encode one column as an Arrow array.
///
/// # Errors
/// Returns [`RsdbError::UnstorableColumn`] if the cells cannot share a type.
pub fn cells_to_array(column: &str, cells: &[Cell]) -> Result<ArrayRef> {
    let shape = infer_shape(column, cells)?;
    let refs: Vec<&Cell> = cells.iter().collect();
    build_array(&shape, &refs).with_context(|| format!("encode column `{column}`"))
}

/// Encode a whole table as one record batch. Every field is nullable.
///
/// # Errors
/// See [`cells_to_array`].
pub fn table_to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays = Vec::with_capacity(table.num_columns());
    for c in table.columns() {
        let array = cells_to_array(&c.name, &c.cells)?;
        fields.push(Field::new(&c.name, array.data_type().clone(), true));
        arrays.push(array);
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("build RecordBatch")
}

/// Decode every slot of an array.
///
/// # Errors
/// Returns an error if an unsupported value cannot be rendered.
pub fn array_to_cells(array: &dyn Array) -> Result<Vec<Cell>> {
    (0..array.len()).map(|i| cell_at(array, i)).collect()
}

fn cell_at(array: &dyn Array, i: usize) -> Result<Cell> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(i) {
        return Ok(Cell::Null);
    }
    Ok(match array.data_type() {
        DataType::Boolean => Cell::Bool(array.as_boolean().value(i)),
        DataType::Int8 => Cell::Int(i64::from(array.as_primitive::<Int8Type>().value(i))),
        DataType::Int16 => Cell::Int(i64::from(array.as_primitive::<Int16Type>().value(i))),
        DataType::Int32 => Cell::Int(i64::from(array.as_primitive::<Int32Type>().value(i))),
        DataType::Int64 => Cell::Int(array.as_primitive::<Int64Type>().value(i)),
        DataType::UInt8 => Cell::Int(i64::from(array.as_primitive::<UInt8Type>().value(i))),
        DataType::UInt16 => Cell::Int(i64::from(array.as_primitive::<UInt16Type>().value(i))),
        DataType::UInt32 => Cell::Int(i64::from(array.as_primitive::<UInt32Type>().value(i))),
        DataType::UInt64 => {
            let v = array.as_primitive::<UInt64Type>().value(i);
            i64::try_from(v).map_or(Cell::Float(v as f64), Cell::Int)
        }
        DataType::Float32 => Cell::Float(f64::from(array.as_primitive::<Float32Type>().value(i))),
        DataType::Float64 => Cell::Float(array.as_primitive::<Float64Type>().value(i)),
        DataType::Utf8 => Cell::Str(array.as_string::<i32>().value(i).to_string()),
        DataType::LargeUtf8 => Cell::Str(array.as_string::<i64>().value(i).to_string()),
        DataType::Utf8View => Cell::Str(array.as_string_view().value(i).to_string()),
        DataType::List(_) => Cell::List(array_to_cells(array.as_list::<i32>().value(i).as_ref())?),
        DataType::LargeList(_) => {
            Cell::List(array_to_cells(array.as_list::<i64>().value(i).as_ref())?)
        }
        DataType::FixedSizeList(_, _) => {
            Cell::List(array_to_cells(array.as_fixed_size_list().value(i).as_ref())?)
        }
        DataType::Struct(_) => {
            let s = array.as_struct();
            let mut m = BTreeMap::new();
            let mut absent = Vec::new();
            for (field, child) in s.fields().iter().zip(s.columns()) {
                let value = cell_at(child.as_ref(), i)?;
                if field.name() == ABSENT_KEYS_FIELD {
                    if let Cell::List(keys) = value {
                        absent = keys;
                    }
                } else {
                    m.insert(field.name().clone(), value);
                }
            }
            for key in absent.iter().filter_map(Cell::as_str) {
                m.remove(key);
            }
            Cell::Map(m)
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())
                .context("format Arrow value")?;
            Cell::Str(formatter.value(i).to_string())
        }
    })
}
