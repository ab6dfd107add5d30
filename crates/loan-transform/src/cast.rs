//! Declared dtype casting.

use std::collections::BTreeMap;

use loan_model::ColumnType;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Polars dtype backing a declared column type.
pub fn polars_dtype(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Int32 => DataType::Int32,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::String => DataType::String,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Date => DataType::Date,
    }
}

/// Cast every declared column to its type.
///
/// Casts are strict: a value that cannot be represented in the target type
/// fails the whole table instead of turning into a null. Columns absent from
/// the map are left as loaded.
pub fn cast_table(mut df: DataFrame, dtypes: &BTreeMap<String, ColumnType>) -> Result<DataFrame> {
    for (name, column_type) in dtypes {
        let target = polars_dtype(*column_type);
        let column = df
            .column(name)
            .map_err(|_| TransformError::MissingColumn {
                column: name.clone(),
            })?;
        if column.dtype() == &target {
            continue;
        }
        let cast = column
            .strict_cast(&target)
            .map_err(|e| TransformError::Cast {
                column: name.clone(),
                from: column.dtype().to_string(),
                to: column_type.to_string(),
                message: e.to_string(),
            })?;
        df.with_column(cast)?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtypes(entries: &[(&str, ColumnType)]) -> BTreeMap<String, ColumnType> {
        entries
            .iter()
            .map(|(name, dtype)| ((*name).to_string(), *dtype))
            .collect()
    }

    #[test]
    fn casts_declared_columns_only() {
        let df = df!(
            "loan_id" => ["5314", "5316"],
            "amount" => [96396i64, 165960],
            "status" => ["B", "A"]
        )
        .unwrap();

        let cast = cast_table(
            df,
            &dtypes(&[("loan_id", ColumnType::Int64), ("amount", ColumnType::Float64)]),
        )
        .unwrap();

        assert_eq!(cast.column("loan_id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(cast.column("amount").unwrap().dtype(), &DataType::Float64);
        assert_eq!(cast.column("status").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn non_numeric_text_fails_loudly() {
        let df = df!("amount" => ["12.5", "lots"]).unwrap();

        let err = cast_table(df, &dtypes(&[("amount", ColumnType::Float64)])).unwrap_err();

        match err {
            TransformError::Cast { column, to, .. } => {
                assert_eq!(column, "amount");
                assert_eq!(to, "float64");
            }
            other => panic!("expected cast error, got {other:?}"),
        }
    }

    #[test]
    fn nulls_survive_strict_cast() {
        let df = df!("account_id" => [Some("1"), None, Some("3")]).unwrap();

        let cast = cast_table(df, &dtypes(&[("account_id", ColumnType::Int64)])).unwrap();

        assert_eq!(cast.column("account_id").unwrap().null_count(), 1);
    }

    #[test]
    fn missing_declared_column_is_an_error() {
        let df = df!("account_id" => [1i64]).unwrap();

        let err = cast_table(df, &dtypes(&[("district_id", ColumnType::Int64)])).unwrap_err();

        assert!(matches!(err, TransformError::MissingColumn { column } if column == "district_id"));
    }
}
