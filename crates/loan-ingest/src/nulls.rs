//! Conditional null-dropping policy.
//!
//! The missingness fraction is the number of missing cells in the inspected
//! columns divided by the row count. Rows are dropped only when that fraction
//! is strictly between 0 and [`NULL_DROP_THRESHOLD`]; heavier missingness is
//! kept so the table stays complete.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Fraction at or above which rows with missing values are kept.
pub const NULL_DROP_THRESHOLD: f64 = 0.05;

/// What the policy did with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullAction {
    /// No missing values in the inspected columns.
    Clean,
    /// Rows with missing values were removed.
    Dropped { rows: usize },
    /// Missingness too high to drop; table returned unchanged.
    Retained,
}

#[derive(Debug, Clone)]
pub struct NullDropOutcome {
    pub table: DataFrame,
    pub fraction: f64,
    pub action: NullAction,
}

/// Missing cells in `subset` (or every column) divided by the row count.
///
/// An empty table has a fraction of 0.
pub fn missing_fraction(df: &DataFrame, subset: Option<&[String]>) -> Result<f64> {
    let columns = inspected_columns(df, subset)?;
    if df.height() == 0 {
        return Ok(0.0);
    }
    let mut missing = 0usize;
    for name in &columns {
        missing += df.column(name)?.null_count();
    }
    Ok(missing as f64 / df.height() as f64)
}

/// Apply the null-dropping policy to a table.
pub fn drop_nulls(df: DataFrame, subset: Option<&[String]>) -> Result<NullDropOutcome> {
    let fraction = missing_fraction(&df, subset)?;

    if fraction == 0.0 {
        debug!("no null values in table; returned table is unchanged");
        return Ok(NullDropOutcome {
            table: df,
            fraction,
            action: NullAction::Clean,
        });
    }

    if fraction >= NULL_DROP_THRESHOLD {
        warn!(
            fraction,
            "more than 5% of rows are missing data; keeping table without dropping rows"
        );
        return Ok(NullDropOutcome {
            table: df,
            fraction,
            action: NullAction::Retained,
        });
    }

    let columns = inspected_columns(&df, subset)?;
    let mut keep = BooleanChunked::full("keep".into(), true, df.height());
    for name in &columns {
        keep = &keep & &df.column(name)?.is_not_null();
    }
    let table = df.filter(&keep)?;
    let rows = df.height() - table.height();
    warn!(
        fraction,
        dropped_rows = rows,
        "less than 5% of rows are missing data; dropped rows with null values"
    );
    Ok(NullDropOutcome {
        table,
        fraction,
        action: NullAction::Dropped { rows },
    })
}

fn inspected_columns(df: &DataFrame, subset: Option<&[String]>) -> Result<Vec<String>> {
    match subset {
        Some(columns) => {
            for column in columns {
                if df.column(column).is_err() {
                    return Err(IngestError::MissingSubsetColumn {
                        column: column.clone(),
                    });
                }
            }
            Ok(columns.to_vec())
        }
        None => Ok(df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()),
    }
}
