//! Delimited text reading.

use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Read a delimited file with a header row into a DataFrame.
///
/// Column types are inferred from every row so a late non-numeric value
/// surfaces as a string column rather than a parse failure. Empty fields
/// load as nulls.
pub fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|parse_options| parse_options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate_headers(&df, path)?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read delimited table"
    );
    Ok(df)
}

/// Reject header rows that cannot come from a text table.
///
/// Binary payloads occasionally decode as a single garbled column; blank or
/// control-character names are the reliable tell.
fn validate_headers(df: &DataFrame, path: &Path) -> Result<()> {
    for name in df.get_column_names() {
        if name.trim().is_empty() || name.chars().any(char::is_control) {
            return Err(IngestError::Parse {
                path: path.to_path_buf(),
                message: format!("invalid column name {:?}", name.as_str()),
            });
        }
    }
    Ok(())
}
