//! Behavior shared by both formats: equivalence and suffix dispatch.

#![cfg(all(feature = "io-csv", feature = "io-parquet"))]

use rsdb_utils::testing::*;
use rsdb_utils::*;

#[test]
fn both_formats_read_the_same_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv = tmp.path().join("rsdb.csv");
    let parquet = tmp.path().join("rsdb.parquet");
    let table = sample_table()?;

    write_rsdb(&table, &csv)?;
    write_rsdb(&table, &parquet)?;
    assert_tables_equal(&read_rsdb(&csv)?, &read_rsdb(&parquet)?);
    Ok(())
}

#[test]
fn converting_between_formats_is_lossless() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let parquet = tmp.path().join("rsdb.parquet");
    let csv = tmp.path().join("rsdb.CSV");
    let parquet_again = tmp.path().join("again.PARQUET");

    write_rsdb(&sample_table()?, &parquet)?;
    write_rsdb(&read_rsdb(&parquet)?, &csv)?;
    write_rsdb(&read_rsdb(&csv)?, &parquet_again)?;
    assert_tables_equal(&read_rsdb(&parquet_again)?, &sample_table()?);
    Ok(())
}

#[test]
fn write_leaves_the_table_untouched() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let table = sample_table()?;
    let before = table.clone();
    write_rsdb(&table, tmp.path().join("rsdb.csv"))?;
    write_rsdb(&table, tmp.path().join("rsdb.parquet"))?;
    assert_eq!(table, before);
    Ok(())
}

#[test]
fn unsupported_suffix_has_no_side_effect() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("rsdb.txt");

    let err = write_rsdb(&sample_table()?, &path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RsdbError>(),
        Some(RsdbError::UnsupportedFormat { .. })
    ));
    assert!(!path.exists());

    let err = read_rsdb(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RsdbError>(),
        Some(RsdbError::UnsupportedFormat { .. })
    ));
    Ok(())
}

#[test]
fn checked_table_survives_a_write() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let validator = RsdbValidator::new(&sample_schema()?)?;
    let mut report = check_rsdb(sample_table_with_errors()?, &validator);
    // `notes` mixes text and numbers, which Parquet cannot store
    report.table.remove_column("notes");

    for name in ["checked.csv", "checked.parquet"] {
        let path = tmp.path().join(name);
        write_rsdb(&report.table, &path)?;
        let back = read_rsdb(&path)?;
        assert_eq!(
            back.column(SCHEMA_ERRORS_COLUMN),
            report.table.column(SCHEMA_ERRORS_COLUMN)
        );
        assert_eq!(column_sum(&back, NB_SCHEMA_ERRORS_COLUMN), SAMPLE_ERROR_COUNT as i64);
    }
    Ok(())
}

#[test]
fn checker_agrees_across_formats() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let validator = RsdbValidator::new(&sample_schema()?)?;
    let mut table = sample_table_with_errors()?;
    // `notes` mixes text and numbers, which Parquet cannot store
    table.remove_column("notes");

    let csv = tmp.path().join("errors.csv");
    let parquet = tmp.path().join("errors.parquet");
    write_rsdb(&table, &csv)?;
    write_rsdb(&table, &parquet)?;

    let direct = check_rsdb(table, &validator);
    let from_csv = check_rsdb(read_rsdb(&csv)?, &validator);
    let from_parquet = check_rsdb(read_rsdb(&parquet)?, &validator);
    assert_eq!(from_csv, direct);
    assert_eq!(from_parquet, direct);
    Ok(())
}

#[test]
fn enum_catalog_reads_the_same_from_both_formats() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let table = generate_enum_catalog(&sample_schema()?)?.to_table()?;
    let csv = tmp.path().join("enums.csv");
    let parquet = tmp.path().join("enums.parquet");
    write_rsdb(&table, &csv)?;
    write_rsdb(&table, &parquet)?;
    assert_tables_equal(&read_rsdb(&csv)?, &table);
    assert_tables_equal(&read_rsdb(&parquet)?, &table);
    Ok(())
}

#[test]
fn integers_next_to_floats_read_back_as_floats() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let table = Table::new().with_column(
        "extent_km2",
        vec![Cell::Int(1), Cell::Float(0.5), Cell::Null],
    )?;
    let widened = [Cell::Float(1.0), Cell::Float(0.5), Cell::Null];

    for name in ["mixed.csv", "mixed.parquet"] {
        let path = tmp.path().join(name);
        write_rsdb(&table, &path)?;
        assert_column_equal(&read_rsdb(&path)?, "extent_km2", &widened);
    }
    Ok(())
}
