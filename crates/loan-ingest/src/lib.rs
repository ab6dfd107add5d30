//! Bronze table ingestion.
//!
//! This crate reads the raw delimited source files into Polars DataFrames,
//! applies the conditional null-dropping policy, and persists or reloads the
//! merged silver table.
//!
//! # Features
//!
//! - **Delimited loading**: configurable separator, header row required
//! - **Null policy**: rows with missing values dropped only below a 5% threshold
//! - **Persistence**: CSV output, CSV-then-IPC fallback on load
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use loan_ingest::{drop_nulls, read_delimited};
//!
//! let df = read_delimited(Path::new("data/bronze/account.asc"), b';')?;
//! let outcome = drop_nulls(df, None)?;
//! ```

mod csv;
mod error;
mod nulls;
mod persist;

pub use csv::read_delimited;
pub use error::{IngestError, Result};
pub use nulls::{NULL_DROP_THRESHOLD, NullAction, NullDropOutcome, drop_nulls, missing_fraction};
pub use persist::{SilverFormat, load_silver, write_csv};
