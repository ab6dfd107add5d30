//! Date column parsing.
//!
//! Source dates arrive as compact strings (or integers) such as `930101`.
//! They are converted into a Polars `Date` column; anything that does not
//! match the pattern becomes null rather than an error.

use std::fmt::Write as _;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Counts from parsing a single date column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParseSummary {
    pub parsed: usize,
    /// Non-null values that did not match the pattern.
    pub malformed: usize,
}

/// Parse one value with a `chrono` format string.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, format).ok()
}

/// Replace `column` with its parsed `Date` equivalent.
///
/// A column that is already `Date` is left untouched, so re-running the
/// normalizer is a no-op.
pub fn parse_date_column(
    df: &mut DataFrame,
    column: &str,
    format: &str,
) -> Result<DateParseSummary> {
    let source = df
        .column(column)
        .map_err(|_| TransformError::MissingColumn {
            column: column.to_string(),
        })?;
    if source.dtype() == &DataType::Date {
        return Ok(DateParseSummary {
            parsed: source.len() - source.null_count(),
            malformed: 0,
        });
    }

    let text = if source.dtype().is_integer() {
        zero_padded(source, format)?
    } else {
        source.cast(&DataType::String)?.str()?.clone()
    };
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let mut summary = DateParseSummary::default();
    let days: Int32Chunked = text
        .into_iter()
        .map(|value| {
            let value = value?;
            match parse_date(value, format) {
                Some(date) => {
                    summary.parsed += 1;
                    i32::try_from((date - epoch).num_days()).ok()
                }
                None => {
                    summary.malformed += 1;
                    None
                }
            }
        })
        .collect();
    let dates = days
        .with_name(column.into())
        .into_series()
        .cast(&DataType::Date)?;
    df.with_column(dates)?;

    if summary.malformed > 0 {
        tracing::warn!(
            column,
            malformed = summary.malformed,
            "date values did not match '{format}' and were set to missing"
        );
    }
    Ok(summary)
}

/// Render integer dates as text, restoring the leading zeros lost when the
/// column was inferred as numeric (`50101` is `050101` under `%y%m%d`).
fn zero_padded(source: &Column, format: &str) -> Result<StringChunked> {
    let width = rendered_width(format);
    let values = source.cast(&DataType::Int64)?;
    Ok(values
        .i64()?
        .into_iter()
        .map(|value| value.map(|v| format!("{v:0width$}")))
        .collect())
}

/// Length of a date rendered with `format`; zero when the format is invalid.
fn rendered_width(format: &str) -> usize {
    let Some(sample) = NaiveDate::from_ymd_opt(2000, 1, 1) else {
        return 0;
    };
    let mut rendered = String::new();
    match write!(rendered, "{}", sample.format(format)) {
        Ok(()) => rendered.len(),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%y%m%d";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn dates_of(df: &DataFrame, column: &str) -> Vec<Option<NaiveDate>> {
        let epoch = date(1970, 1, 1);
        df.column(column)
            .unwrap()
            .cast(&DataType::Int32)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .map(|days| days.map(|d| epoch + chrono::Duration::days(i64::from(d))))
            .collect()
    }

    #[test]
    fn parse_date_two_digit_years() {
        assert_eq!(parse_date("930101", FORMAT), Some(date(1993, 1, 1)));
        assert_eq!(parse_date("981231", FORMAT), Some(date(1998, 12, 31)));
        assert_eq!(parse_date(" 950324 ", FORMAT), Some(date(1995, 3, 24)));
    }

    #[test]
    fn parse_date_rejects_malformed() {
        assert_eq!(parse_date("", FORMAT), None);
        assert_eq!(parse_date("931301", FORMAT), None);
        assert_eq!(parse_date("not-a-date", FORMAT), None);
        assert_eq!(parse_date("706213", FORMAT), None);
    }

    #[test]
    fn integer_column_is_parsed() {
        let mut df = df!("date" => [930101i64, 950324]).unwrap();

        let summary = parse_date_column(&mut df, "date", FORMAT).unwrap();

        assert_eq!(summary, DateParseSummary { parsed: 2, malformed: 0 });
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            dates_of(&df, "date"),
            vec![Some(date(1993, 1, 1)), Some(date(1995, 3, 24))]
        );
    }

    #[test]
    fn integer_dates_before_2010_keep_their_leading_zero() {
        let mut df = df!("date" => [Some(50101i64), Some(930101), None]).unwrap();

        let summary = parse_date_column(&mut df, "date", FORMAT).unwrap();

        assert_eq!(summary, DateParseSummary { parsed: 2, malformed: 0 });
        assert_eq!(
            dates_of(&df, "date"),
            vec![Some(date(2005, 1, 1)), Some(date(1993, 1, 1)), None]
        );
    }

    #[test]
    fn padding_width_follows_the_format() {
        assert_eq!(rendered_width(FORMAT), 6);
        assert_eq!(rendered_width("%Y%m%d"), 8);
    }

    #[test]
    fn malformed_values_become_missing_and_rows_are_kept() {
        let mut df = df!(
            "loan_id" => [1i64, 2, 3, 4],
            "date" => [Some("930711"), Some("garbage"), None, Some("931399")]
        )
        .unwrap();

        let summary = parse_date_column(&mut df, "date", FORMAT).unwrap();

        assert_eq!(summary, DateParseSummary { parsed: 1, malformed: 2 });
        assert_eq!(df.height(), 4);
        assert_eq!(
            dates_of(&df, "date"),
            vec![Some(date(1993, 7, 11)), None, None, None]
        );
    }

    #[test]
    fn reparsing_is_idempotent() {
        let mut df = df!("date" => ["930101", "960612"]).unwrap();
        parse_date_column(&mut df, "date", FORMAT).unwrap();
        let first = df.clone();

        parse_date_column(&mut df, "date", FORMAT).unwrap();

        assert!(df.equals_missing(&first));
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let mut df = df!("other" => [1i64]).unwrap();
        let err = parse_date_column(&mut df, "date", FORMAT).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { .. }));
    }
}
