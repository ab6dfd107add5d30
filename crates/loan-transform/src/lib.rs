//! Bronze table normalization.
//!
//! This crate coerces raw tables to their declared schema before any join:
//!
//! - **cast**: strict dtype casting from the per-table type map
//! - **dates**: `YYMMDD`-style string columns parsed into calendar dates
//! - **normalize**: both steps applied to one table from its [`TableSpec`]
//!
//! [`TableSpec`]: loan_model::TableSpec

pub mod cast;
pub mod dates;
mod error;
pub mod normalize;

pub use cast::{cast_table, polars_dtype};
pub use dates::{DateParseSummary, parse_date, parse_date_column};
pub use error::{Result, TransformError};
pub use normalize::{NormalizedTable, normalize_table};
