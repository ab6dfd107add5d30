//! Data model for the loan bronze-to-silver pipeline.
//!
//! Everything the pipeline is configured with lives here as typed records:
//!
//! - **table**: per-table source files, declared column types, date columns
//! - **join**: join stages, join kinds, suffix pairs and the full join plan
//! - **config**: project and pipeline configuration loaded from TOML
//! - **schema**: expected silver schema and the structured validation verdict

pub mod config;
pub mod error;
pub mod join;
pub mod schema;
pub mod table;

pub use config::{LoanConfig, LogLevel, PipelineConfig, ProjectConfig};
pub use error::{ConfigError, Result};
pub use join::{JoinKind, JoinPlan, JoinStage, MergeStage, SuffixPair};
pub use schema::{ExpectedColumn, ExpectedSchema, SchemaIssue, SchemaReport, SchemaVerdict};
pub use table::{ColumnType, TableKind, TableSpec, TableSpecs};
