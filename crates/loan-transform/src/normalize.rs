//! Per-table normalization.

use loan_model::TableSpec;
use polars::prelude::{DataFrame, DataType};

use crate::cast::cast_table;
use crate::dates::{DateParseSummary, parse_date_column};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub table: DataFrame,
    /// Present when the table declares a date column.
    pub dates: Option<DateParseSummary>,
}

/// Cast a table to its declared dtypes, then parse its date column.
///
/// A date column that is already parsed keeps its `Date` type even when the
/// table declares it as text, so normalizing twice changes nothing.
pub fn normalize_table(df: DataFrame, spec: &TableSpec, date_format: &str) -> Result<NormalizedTable> {
    let mut dtypes = spec.dtypes.clone();
    if let Some(column) = &spec.date_column
        && df
            .column(column)
            .is_ok_and(|c| c.dtype() == &DataType::Date)
    {
        dtypes.remove(column);
    }
    let mut table = cast_table(df, &dtypes)?;
    let dates = match &spec.date_column {
        Some(column) => Some(parse_date_column(&mut table, column, date_format)?),
        None => None,
    };
    Ok(NormalizedTable { table, dates })
}
