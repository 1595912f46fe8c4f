//! Pre-built schema and tables for common testing scenarios.

use crate::cell::Cell;
use crate::schema::SchemaDocument;
use crate::table::Table;
use anyhow::Result;

/// A trimmed-down case study schema: nested contributor objects behind
/// `$ref`, `allOf` wrappers, scalar and list enums, and a numeric sub-property.
pub const SAMPLE_SCHEMA_JSON: &str = include_str!("../../tests/data/case_study_schema.json");

/// Violations in [`sample_table_with_errors`].
pub const SAMPLE_ERROR_COUNT: usize = 3;

/// Rows of [`sample_table_with_errors`] that violate the schema.
pub const SAMPLE_ERROR_ROWS: [usize; 2] = [1, 3];

/// Parse [`SAMPLE_SCHEMA_JSON`].
///
/// # Errors
/// Only if the embedded document is corrupt.
pub fn sample_schema() -> Result<SchemaDocument> {
    SchemaDocument::parse(SAMPLE_SCHEMA_JSON)
}

fn contributor(name: &str, orcid: Option<&str>) -> Cell {
    Cell::map([("name", Cell::from(name)), ("orcid", Cell::from(orcid))])
}

fn shift_type(value: &str, other: Option<&str>) -> Cell {
    let mut entry = vec![("value", Cell::from(value))];
    if let Some(other) = other {
        entry.push(("other", Cell::from(other)));
    }
    Cell::List(vec![Cell::map(entry)])
}

fn scale(extent_km2: f64, description: &str) -> Cell {
    Cell::List(vec![Cell::map([
        ("extent_km2", Cell::Float(extent_km2)),
        ("description", Cell::from(description)),
    ])])
}

/// Three case studies that comply with [`sample_schema`].
///
/// Only the proposed regime shift type carries an `other` key, so the
/// mappings of that column differ in their keys. Every number column holds a
/// single numeric type, so the table survives both file formats unchanged.
///
/// # Errors
/// Never in practice; columns have equal length.
pub fn sample_table() -> Result<Table> {
    Table::new()
        .with_column(
            "case_study_name",
            vec![
                Cell::from("Balinese rice production"),
                Cell::from("Central Baltic Sea food web"),
                Cell::from("Gulf of Riga"),
            ],
        )?
        .with_column(
            "main_contributors",
            vec![
                Cell::List(vec![contributor("Stephen Lansing", None)]),
                Cell::List(vec![contributor("Johanna Yletyinen", None)]),
                Cell::List(vec![
                    contributor("Anna Kowalska", Some("0000-0002-1825-0097")),
                    contributor("Mart Tamm", None),
                ]),
            ],
        )?
        .with_column(
            "location_region",
            vec![Cell::from("Bali"), Cell::Null, Cell::from("The Baltic Sea")],
        )?
        .with_column(
            "ecosystem_type",
            vec![
                Cell::from("Terrestrial"),
                Cell::from("Marine"),
                Cell::from("Marine"),
            ],
        )?
        .with_column(
            "year_of_shift",
            vec![Cell::Int(1971), Cell::Int(1988), Cell::Null],
        )?
        .with_column(
            "landscape_keywords",
            vec![
                Cell::List(vec![Cell::from("Forest")]),
                Cell::List(vec![Cell::from("Coastal")]),
                Cell::Null,
            ],
        )?
        .with_column(
            "regime_shift_type",
            vec![
                shift_type("Proposed & new type", Some("Irrigation system breakdown")),
                shift_type("Fisheries collapse", None),
                shift_type("Eutrophication", None),
            ],
        )?
        .with_column(
            "spatial_scale",
            vec![
                scale(5780.0, "Island"),
                scale(211000.5, "Sea basin"),
                Cell::Null,
            ],
        )
}

/// Four case studies plus an extension `notes` column. Row 1 has an
/// `ecosystem_type` outside the enum; row 3 has a `year_of_shift` below the
/// minimum and a contributor without a name.
///
/// # Errors
/// Never in practice; columns have equal length.
pub fn sample_table_with_errors() -> Result<Table> {
    Table::new()
        .with_column(
            "case_study_name",
            vec![
                Cell::from("Balinese rice production"),
                Cell::from("Coral reef bleaching"),
                Cell::from("Gulf of Riga"),
                Cell::from("Lake Mendota"),
            ],
        )?
        .with_column(
            "main_contributors",
            vec![
                Cell::List(vec![contributor("Stephen Lansing", None)]),
                Cell::List(vec![contributor("Terry Hughes", None)]),
                Cell::Null,
                Cell::List(vec![Cell::map([("orcid", Cell::Null)])]),
            ],
        )?
        .with_column(
            "ecosystem_type",
            vec![
                Cell::from("Terrestrial"),
                Cell::from("Ocean"),
                Cell::from("Marine"),
                Cell::from("Freshwater"),
            ],
        )?
        .with_column(
            "year_of_shift",
            vec![Cell::Int(1971), Cell::Int(1998), Cell::Null, Cell::Int(500)],
        )?
        .with_column(
            "notes",
            vec![
                Cell::Null,
                Cell::from("extension column, not in the schema"),
                Cell::Int(42),
                Cell::Null,
            ],
        )
}
