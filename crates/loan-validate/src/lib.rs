//! Schema verdicts for the silver table.
//!
//! Validation is observational: [`validate_schema`] never fails and callers
//! only log the resulting [`SchemaReport`]. The verdict is structured so a
//! caller can decide to enforce it without parsing messages.

mod validator;

pub use validator::{schema_issues, validate_schema};
