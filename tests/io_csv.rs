#![cfg(feature = "io-csv")]

use rsdb_utils::testing::*;
use rsdb_utils::*;
use std::fs;

#[test]
fn csv_roundtrip_keeps_logical_values() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("rsdb.csv");
    let table = sample_table()?;

    let n = write_rsdb(&table, &path)?;
    assert_eq!(n, 3);

    let mut warnings = WarningCollector::new();
    let back = read_rsdb_with(&path, &mut warnings)?;
    assert!(warnings.is_empty());
    assert_tables_equal(&back, &table);
    Ok(())
}

#[test]
fn composite_cells_are_stored_as_json_text() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("rsdb.csv");
    write_rsdb(&sample_table()?, &path)?;

    let contents = fs::read_to_string(&path)?;
    let header = contents.lines().next().unwrap_or_default();
    assert!(header.starts_with("case_study_name,main_contributors,location_region"));
    assert!(contents.contains(r#"[{""name"":""Johanna Yletyinen"",""orcid"":null}]"#));
    Ok(())
}

#[test]
fn read_infers_types_like_the_stored_values() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("typed.csv");
    fs::write(
        &path,
        "case_study_name,main_contributors,year_of_shift,location_region\n\
         Balinese rice production,\"[{\"\"name\"\": \"\"Stephen Lansing\"\", \"\"orcid\"\": null}]\",1971,Bali\n\
         Central Baltic Sea food web,\"[{\"\"name\"\": \"\"Johanna Yletyinen\"\", \"\"orcid\"\": null}]\",,The Baltic Sea\n",
    )?;

    let table = read_rsdb(&path)?;
    assert_eq!(
        table.get(0, "case_study_name"),
        Some(&Cell::from("Balinese rice production"))
    );
    assert_eq!(
        table.get(1, "main_contributors"),
        Some(&Cell::List(vec![Cell::map([
            ("name", Cell::from("Johanna Yletyinen")),
            ("orcid", Cell::Null),
        ])]))
    );
    assert_column_equal(&table, "year_of_shift", &[Cell::Int(1971), Cell::Null]);
    assert_eq!(table.get(1, "location_region"), Some(&Cell::from("The Baltic Sea")));
    Ok(())
}

#[test]
fn malformed_json_cell_is_kept_with_one_warning() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("broken.csv");
    fs::write(&path, "case_study_name,notes\nA,[unterminated\nB,plain text\n")?;

    let mut warnings = WarningCollector::new();
    let table = read_rsdb_with(&path, &mut warnings)?;

    assert_eq!(table.get(0, "notes"), Some(&Cell::from("[unterminated")));
    assert_eq!(table.get(1, "notes"), Some(&Cell::from("plain text")));
    assert_eq!(warnings.len(), 1);
    match &warnings.warnings()[0] {
        Warning::MalformedJsonCell {
            column, row, value, ..
        } => {
            assert_eq!(column, "notes");
            assert_eq!(*row, 0);
            assert_eq!(value, "[unterminated");
        }
        other => panic!("unexpected warning {other:?}"),
    }
    Ok(())
}

#[test]
fn unicode_is_written_verbatim() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("unicode.csv");
    let table = Table::new().with_column(
        "landscape_keywords",
        vec![Cell::List(vec![Cell::from("Åland Islands"), Cell::from("Tōhoku")])],
    )?;
    write_rsdb(&table, &path)?;
    let contents = fs::read_to_string(&path)?;
    assert!(contents.contains("Åland Islands"));
    assert!(contents.contains("Tōhoku"));
    assert_tables_equal(&read_rsdb(&path)?, &table);
    Ok(())
}

#[test]
fn custom_delimiter_and_null_marker() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("semi.csv");
    let table = Table::new()
        .with_column("a", vec![Cell::Int(1), Cell::Null])?
        .with_column("b", vec![Cell::from("x;y"), Cell::from("z")])?;
    let opts = CsvOptions::new().delimiter(b';').null_repr("NA");

    write_csv_table(&table, &path, &opts)?;
    let contents = fs::read_to_string(&path)?;
    assert!(contents.contains("NA"));
    assert!(contents.contains("\"x;y\""));

    let back = read_csv_table(&path, &opts, &mut WarningCollector::new())?;
    assert_tables_equal(&back, &table);
    Ok(())
}

#[test]
fn writing_creates_parent_directories() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("nested").join("out").join("rsdb.csv");
    write_rsdb(&sample_table()?, &path)?;
    assert!(path.exists());
    Ok(())
}

#[test]
fn ragged_record_is_an_error() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("ragged.csv");
    fs::write(&path, "a,b\n1,2\n3\n")?;
    let err = read_rsdb(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parse CSV record #2"));
    Ok(())
}

#[test]
fn repeated_header_is_an_error() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("dup.csv");
    fs::write(&path, "a,b,a\n1,x,2\n")?;
    let err = read_rsdb(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RsdbError>(),
        Some(RsdbError::DuplicateColumn { column }) if column == "a"
    ));
    Ok(())
}

#[test]
fn only_bracket_openers_are_read_as_json() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("free_text.csv");
    fs::write(
        &path,
        "notes\n\
         [draft] see notes\n\
         Lake Victoria [Kenya]\n\
         {tbd}\n\
         (see annex)\n\
         \"[1, 2]\"\n",
    )?;

    let mut warnings = WarningCollector::new();
    let table = read_rsdb_with(&path, &mut warnings)?;

    // a leading `[` or `{` is taken as JSON; anything else is plain text
    let flagged: Vec<usize> = warnings.iter().map(Warning::row).collect();
    assert_eq!(flagged, vec![0, 2]);
    assert_column_equal(
        &table,
        "notes",
        &[
            Cell::from("[draft] see notes"),
            Cell::from("Lake Victoria [Kenya]"),
            Cell::from("{tbd}"),
            Cell::from("(see annex)"),
            Cell::List(vec![Cell::Int(1), Cell::Int(2)]),
        ],
    );
    Ok(())
}
