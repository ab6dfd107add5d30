//! Single join step with explicit suffix handling.
//!
//! Columns present on both sides are renamed before the join so the join
//! itself never sees a collision: the left copy gets the left suffix, the
//! right copy the right suffix. When every key pair shares its name the keys
//! are joined once and keep their names; otherwise a same-named key keeps its
//! name on the left and takes the right suffix on the right.
//!
//! Null keys never match each other.

use std::collections::{BTreeMap, BTreeSet};

use loan_model::{JoinKind, JoinStage};
use polars::prelude::*;

use crate::error::{JoinFailure, KeySide};

/// Column renames applied to each side of a join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixPlan {
    pub left: BTreeMap<String, String>,
    pub right: BTreeMap<String, String>,
    /// Key names joined into a single column. Empty unless every key pair
    /// shares its name; otherwise both key copies are kept.
    pub shared_keys: BTreeSet<String>,
}

impl SuffixPlan {
    /// Work out renames for `stage` and reject suffixes that would collide.
    pub fn new(left: &DataFrame, right: &DataFrame, stage: &JoinStage) -> Result<Self, JoinFailure> {
        let same_named: BTreeSet<&str> = stage
            .key_pairs()
            .filter(|(l, r)| l == r)
            .map(|(l, _)| l)
            .collect();
        let coalesce = same_named.len() == stage.left_on.len();
        let right_names: BTreeSet<&str> = right
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .collect();

        let mut plan = SuffixPlan::default();
        if coalesce {
            plan.shared_keys = same_named.iter().map(|k| (*k).to_string()).collect();
        }
        for name in left.get_column_names() {
            let name = name.as_str();
            if !right_names.contains(name) || plan.shared_keys.contains(name) {
                continue;
            }
            // A same-named key that is not coalesced keeps its name on the
            // left; only the right copy is suffixed.
            if !same_named.contains(name) {
                plan.left
                    .insert(name.to_string(), format!("{name}{}", stage.suffixes.left));
            }
            plan.right
                .insert(name.to_string(), format!("{name}{}", stage.suffixes.right));
        }

        let mut seen = BTreeSet::new();
        let left_out = left.get_column_names().into_iter().map(|n| plan.left_name(n));
        let right_out = right
            .get_column_names()
            .into_iter()
            .filter(|n| !plan.shared_keys.contains(n.as_str()))
            .map(|n| plan.right_name(n));
        for name in left_out.chain(right_out) {
            if !seen.insert(name.to_string()) {
                return Err(JoinFailure::SuffixCollision {
                    column: name.to_string(),
                });
            }
        }
        Ok(plan)
    }

    pub fn left_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.left.get(column).map_or(column, String::as_str)
    }

    pub fn right_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.right.get(column).map_or(column, String::as_str)
    }
}

fn join_type(kind: JoinKind) -> JoinType {
    match kind {
        JoinKind::Inner => JoinType::Inner,
        JoinKind::Left => JoinType::Left,
        JoinKind::Right => JoinType::Right,
        JoinKind::Outer => JoinType::Full,
    }
}

fn renamed(df: DataFrame, renames: &BTreeMap<String, String>) -> LazyFrame {
    if renames.is_empty() {
        return df.lazy();
    }
    let exprs: Vec<Expr> = df
        .get_column_names()
        .into_iter()
        .map(|name| match renames.get(name.as_str()) {
            Some(new_name) => col(name.clone()).alias(new_name.as_str()),
            None => col(name.clone()),
        })
        .collect();
    df.lazy().select(exprs)
}

fn check_keys(left: &DataFrame, right: &DataFrame, stage: &JoinStage) -> Result<(), JoinFailure> {
    for (left_key, right_key) in stage.key_pairs() {
        let left_col = left.column(left_key).map_err(|_| JoinFailure::MissingKey {
            side: KeySide::Left,
            column: left_key.to_string(),
        })?;
        let right_col = right.column(right_key).map_err(|_| JoinFailure::MissingKey {
            side: KeySide::Right,
            column: right_key.to_string(),
        })?;
        for (name, dtype) in [(left_key, left_col.dtype()), (right_key, right_col.dtype())] {
            if dtype.is_temporal() {
                return Err(JoinFailure::DateKey {
                    column: name.to_string(),
                });
            }
        }
        if left_col.dtype() != right_col.dtype() {
            return Err(JoinFailure::KeyTypeMismatch {
                left: left_key.to_string(),
                right: right_key.to_string(),
                left_dtype: left_col.dtype().to_string(),
                right_dtype: right_col.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Join two tables as described by `stage`.
///
/// Row order follows the left table, then the right table, so the same inputs
/// always produce the same output.
pub fn join_tables(
    left: DataFrame,
    right: DataFrame,
    stage: &JoinStage,
) -> Result<DataFrame, JoinFailure> {
    check_keys(&left, &right, stage)?;
    let plan = SuffixPlan::new(&left, &right, stage)?;

    let left_on: Vec<Expr> = stage
        .left_on
        .iter()
        .map(|key| col(plan.left_name(key)))
        .collect();
    let right_on: Vec<Expr> = stage
        .right_on
        .iter()
        .map(|key| col(plan.right_name(key)))
        .collect();
    let coalesce = if plan.shared_keys.len() == stage.left_on.len() {
        JoinCoalesce::CoalesceColumns
    } else {
        JoinCoalesce::KeepColumns
    };
    let mut args = JoinArgs::new(join_type(stage.how)).with_coalesce(coalesce);
    args.maintain_order = MaintainOrderJoin::LeftRight;

    let joined = renamed(left, &plan.left)
        .join(renamed(right, &plan.right), left_on, right_on, args)
        .collect()?;

    if let Some(limit) = stage.max_rows
        && joined.height() > limit
    {
        return Err(JoinFailure::RowExplosion {
            rows: joined.height(),
            limit,
        });
    }
    Ok(joined)
}
