//! Tests for bronze table normalization.

use loan_model::{ColumnType, TableSpec, TableSpecs};
use loan_transform::{TransformError, normalize_table};
use polars::prelude::*;

#[test]
fn loan_table_with_bad_status_dates_keeps_every_row() {
    let spec = TableSpecs::default().loan;
    let df = df!(
        "loan_id" => [5314i64, 5316, 6863],
        "account_id" => [1787i64, 1801, 9188],
        "date" => ["930705", "930711", "99999"],
        "amount" => [96396i64, 165960, 127080],
        "duration" => [12i64, 36, 60],
        "payments" => [8033.0f64, 4610.0, 2118.0],
        "status" => ["B", "A", "A"]
    )
    .unwrap();

    let normalized = normalize_table(df, &spec, "%y%m%d").unwrap();

    assert_eq!(normalized.table.height(), 3);
    assert_eq!(normalized.table.column("date").unwrap().null_count(), 1);
    let summary = normalized.dates.unwrap();
    assert_eq!(summary.parsed, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(
        normalized.table.column("amount").unwrap().dtype(),
        &DataType::Float64
    );
}

#[test]
fn cast_failure_is_fatal() {
    let spec = TableSpec::new("disp.asc").with_dtypes(&[("client_id", ColumnType::Int64)]);
    let df = df!("client_id" => ["1", "two"]).unwrap();

    let err = normalize_table(df, &spec, "%y%m%d").unwrap_err();

    assert!(matches!(err, TransformError::Cast { .. }));
    assert!(err.to_string().contains("client_id"));
}

#[test]
fn normalizing_twice_is_stable() {
    let spec = TableSpecs::default().account;
    let df = df!(
        "account_id" => [1i64],
        "district_id" => [18i64],
        "frequency" => ["POPLATEK MESICNE"],
        "date" => ["950324"]
    )
    .unwrap();

    let once = normalize_table(df, &spec, "%y%m%d").unwrap().table;
    let twice = normalize_table(once.clone(), &spec, "%y%m%d").unwrap().table;

    assert!(once.equals_missing(&twice));
}
