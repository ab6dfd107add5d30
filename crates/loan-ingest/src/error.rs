//! Error types for bronze ingestion and silver persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to parse a delimited file with Polars.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Neither the text nor the binary reader accepted the file.
    #[error("unable to load {path} as delimited text ({text}) or Arrow IPC ({binary})")]
    UnsupportedFormat {
        path: PathBuf,
        text: String,
        binary: String,
    },

    /// Null-check subset references a column the table does not have.
    #[error("null check column '{column}' not found in table")]
    MissingSubsetColumn { column: String },

    /// Failed to write a table.
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
