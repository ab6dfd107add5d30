use thiserror::Error;

/// Errors raised while normalizing a bronze table.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error("cannot cast column '{column}' from {from} to {to}: {message}")]
    Cast {
        column: String,
        from: String,
        to: String,
        message: String,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
