use rsdb_utils::testing::*;
use rsdb_utils::*;

fn validator() -> anyhow::Result<RsdbValidator> {
    RsdbValidator::new(&sample_schema()?)
}

#[test]
fn valid_database_has_no_errors() -> anyhow::Result<()> {
    let mut warnings = WarningCollector::new();
    let report = check_rsdb_with(sample_table()?, &validator()?, &mut warnings);

    assert!(report.is_valid());
    assert!(warnings.is_empty());
    assert_eq!(column_sum(&report.table, NB_SCHEMA_ERRORS_COLUMN), 0);
    assert!(
        report
            .table
            .column(SCHEMA_ERRORS_COLUMN)
            .is_some_and(|cells| cells.iter().all(Cell::is_null))
    );
    Ok(())
}

#[test]
fn every_violation_is_counted_and_reported() -> anyhow::Result<()> {
    let mut warnings = WarningCollector::new();
    let report = check_rsdb_with(sample_table_with_errors()?, &validator()?, &mut warnings);

    assert_eq!(report.total_errors, SAMPLE_ERROR_COUNT);
    assert_eq!(report.rows_with_errors, SAMPLE_ERROR_ROWS.to_vec());
    assert_eq!(warnings.count(WarningKind::SchemaViolation), SAMPLE_ERROR_COUNT);
    assert_eq!(
        column_sum(&report.table, NB_SCHEMA_ERRORS_COLUMN),
        SAMPLE_ERROR_COUNT as i64
    );

    let nb = report.table.column(NB_SCHEMA_ERRORS_COLUMN).unwrap_or_default();
    assert_eq!(nb, &[Cell::Null, Cell::Int(1), Cell::Null, Cell::Int(2)]);
    Ok(())
}

#[test]
fn error_text_names_each_failure() -> anyhow::Result<()> {
    let report = check_rsdb(sample_table_with_errors()?, &validator()?);

    let row1 = report
        .table
        .get(1, SCHEMA_ERRORS_COLUMN)
        .and_then(Cell::as_str)
        .unwrap_or_default();
    assert!(row1.starts_with("####################\n"));
    assert!(row1.contains("Ocean"));
    assert!(row1.contains("Failed validating at /properties/ecosystem_type/enum"));
    assert!(row1.contains("On instance at /ecosystem_type"));

    let row3 = report
        .table
        .get(3, SCHEMA_ERRORS_COLUMN)
        .and_then(Cell::as_str)
        .unwrap_or_default();
    assert_eq!(row3.matches("####################").count(), 2);
    assert!(row3.contains("/year_of_shift"));
    assert!(row3.contains("/main_contributors/0"));
    Ok(())
}

#[test]
fn warnings_point_at_offending_rows() -> anyhow::Result<()> {
    let mut warnings = WarningCollector::new();
    let _ = check_rsdb_with(sample_table_with_errors()?, &validator()?, &mut warnings);

    let rows: Vec<usize> = warnings.iter().map(Warning::row).collect();
    assert_eq!(rows, vec![1, 3, 3]);
    for w in &warnings {
        assert!(w.to_string().contains("Database does not comply with the JSON schema"));
    }
    Ok(())
}

#[test]
fn extension_columns_are_ignored() -> anyhow::Result<()> {
    let validator = validator()?;
    assert!(!validator.recognizes("notes"));

    let table = sample_table()?.with_column(
        "my_custom_field",
        vec![Cell::Int(1), Cell::from("anything"), Cell::List(vec![])],
    )?;
    let report = check_rsdb(table, &validator);
    assert!(report.is_valid());
    assert_eq!(
        report.table.get(1, "my_custom_field"),
        Some(&Cell::from("anything"))
    );
    Ok(())
}

#[test]
fn missing_required_field_is_an_error() -> anyhow::Result<()> {
    let table = Table::new().with_column("ecosystem_type", vec![Cell::from("Marine")])?;
    let report = check_rsdb(table, &validator()?);
    assert_eq!(report.total_errors, 1);
    let text = report
        .table
        .get(0, SCHEMA_ERRORS_COLUMN)
        .and_then(Cell::as_str)
        .unwrap_or_default();
    assert!(text.contains("case_study_name"));
    Ok(())
}

#[cfg(feature = "io-csv")]
#[test]
fn database_file_is_checked_after_reading() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("rsdb.csv");
    write_rsdb(&sample_table_with_errors()?, &path)?;

    let mut warnings = WarningCollector::new();
    let table = read_rsdb_with(&path, &mut warnings)?;
    let report = check_rsdb_with(table, &validator()?, &mut warnings);

    assert_eq!(report.total_errors, SAMPLE_ERROR_COUNT);
    assert_eq!(warnings.count(WarningKind::MalformedJsonCell), 0);

    let checked = tmp.path().join("rsdb_checked.csv");
    write_rsdb(&report.table, &checked)?;
    let again = check_rsdb(read_rsdb(&checked)?, &validator()?);
    assert_eq!(again.total_errors, SAMPLE_ERROR_COUNT);
    assert_eq!(again.table.num_columns(), report.table.num_columns());
    Ok(())
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_check_agrees() -> anyhow::Result<()> {
    let validator = validator()?;
    let mut seq = WarningCollector::new();
    let mut par = WarningCollector::new();
    let a = check_rsdb_with(sample_table_with_errors()?, &validator, &mut seq);
    let b = check_rsdb_par(sample_table_with_errors()?, &validator, &mut par);
    assert_eq!(a, b);
    assert_eq!(seq.warnings(), par.warnings());
    Ok(())
}
