//! Expected silver schema and validation verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::ColumnType;

/// One expected column of the silver table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedColumn {
    pub name: String,
    /// Required dtype; any dtype is accepted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<ColumnType>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl ExpectedColumn {
    pub fn new(name: impl Into<String>, dtype: Option<ColumnType>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable,
        }
    }
}

/// Expected structure of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedSchema {
    pub columns: Vec<ExpectedColumn>,
    /// Columns outside `columns` are a mismatch when set.
    pub strict: bool,
    /// Column subset checked when the full schema does not match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Default for ExpectedSchema {
    fn default() -> Self {
        let id = |name: &str| ExpectedColumn::new(name, Some(ColumnType::Int64), false);
        Self {
            columns: vec![
                id("disp_id"),
                id("client_id"),
                id("account_id"),
                id("card_id"),
                id("loan_id"),
                id("order_id"),
                id("trans_id"),
                ExpectedColumn::new("status", Some(ColumnType::String), true),
            ],
            strict: false,
            required: Some(
                ["disp_id", "client_id", "account_id"]
                    .iter()
                    .map(|c| (*c).to_string())
                    .collect(),
            ),
        }
    }
}

/// A single structural difference between a table and its expected schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaIssue {
    MissingColumn {
        column: String,
    },
    UnexpectedColumn {
        column: String,
    },
    WrongType {
        column: String,
        expected: ColumnType,
        actual: String,
    },
    UnexpectedNulls {
        column: String,
        count: usize,
    },
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaIssue::MissingColumn { column } => write!(f, "missing column '{column}'"),
            SchemaIssue::UnexpectedColumn { column } => write!(f, "unexpected column '{column}'"),
            SchemaIssue::WrongType {
                column,
                expected,
                actual,
            } => write!(f, "column '{column}' is {actual}, expected {expected}"),
            SchemaIssue::UnexpectedNulls { column, count } => {
                write!(f, "column '{column}' has {count} null values")
            }
        }
    }
}

/// Outcome of comparing a table against an expected schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVerdict {
    Matched,
    /// Schema differs but the required column subset is present.
    MismatchedSubsetPresent,
    /// Schema differs and required columns are missing too.
    MismatchedSubsetMissing,
    /// Schema differs and no required subset was supplied.
    MismatchedNotChecked,
}

impl SchemaVerdict {
    pub fn is_match(self) -> bool {
        self == SchemaVerdict::Matched
    }

    pub fn message(self) -> &'static str {
        match self {
            SchemaVerdict::Matched => "Correct schema, no action needed",
            SchemaVerdict::MismatchedSubsetPresent => {
                "Provided schema does not match dataframe schema but dataframe has expected columns"
            }
            SchemaVerdict::MismatchedSubsetMissing => {
                "Provided schema does not match dataframe schema. \
                 Dataframe also does not have expected columns"
            }
            SchemaVerdict::MismatchedNotChecked => {
                "Provided schema does not match dataframe schema. \
                 Did not check for subset of columns - no required columns provided"
            }
        }
    }
}

impl fmt::Display for SchemaVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Verdict plus every issue found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub verdict: SchemaVerdict,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaReport {
    pub fn matched() -> Self {
        Self {
            verdict: SchemaVerdict::Matched,
            issues: Vec::new(),
        }
    }
}
