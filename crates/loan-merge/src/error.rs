use std::fmt;

use loan_model::MergeStage;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Which input of a join a key column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySide {
    Left,
    Right,
}

impl fmt::Display for KeySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeySide::Left => "left",
            KeySide::Right => "right",
        })
    }
}

/// Why a single join step failed.
#[derive(Debug, Error)]
pub enum JoinFailure {
    #[error("{side} key column '{column}' not found")]
    MissingKey { side: KeySide, column: String },

    #[error("key type mismatch: left '{left}' is {left_dtype}, right '{right}' is {right_dtype}")]
    KeyTypeMismatch {
        left: String,
        right: String,
        left_dtype: String,
        right_dtype: String,
    },

    #[error("date column '{column}' cannot be used as a join key")]
    DateKey { column: String },

    #[error("suffixes produce duplicate column '{column}'")]
    SuffixCollision { column: String },

    #[error("join produced {rows} rows, above the limit of {limit}")]
    RowExplosion { rows: usize, limit: usize },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// A join failure attributed to its merge stage and step.
#[derive(Debug, Error)]
#[error("{stage} merge failed at join '{step}': {source}")]
pub struct MergeError {
    pub stage: MergeStage,
    pub step: &'static str,
    #[source]
    pub source: JoinFailure,
}

impl MergeError {
    pub fn new(stage: MergeStage, step: &'static str, source: JoinFailure) -> Self {
        Self {
            stage,
            step,
            source,
        }
    }
}
