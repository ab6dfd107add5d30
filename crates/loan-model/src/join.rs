//! Join stage configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Join type applied by a single join stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Keep only rows matched on both sides.
    #[default]
    Inner,
    /// Keep every left row, nulls for unmatched right columns.
    Left,
    /// Keep every right row, nulls for unmatched left columns.
    Right,
    /// Keep all rows from both sides.
    #[serde(alias = "full")]
    Outer,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
        })
    }
}

/// Suffixes appended to colliding column names, `(left, right)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct SuffixPair {
    pub left: String,
    pub right: String,
}

impl SuffixPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Default for SuffixPair {
    fn default() -> Self {
        Self::new("_x", "_y")
    }
}

impl From<(String, String)> for SuffixPair {
    fn from((left, right): (String, String)) -> Self {
        Self { left, right }
    }
}

impl From<SuffixPair> for (String, String) {
    fn from(pair: SuffixPair) -> Self {
        (pair.left, pair.right)
    }
}

/// One discrete merge between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStage {
    pub left_on: Vec<String>,
    pub right_on: Vec<String>,
    #[serde(default)]
    pub how: JoinKind,
    #[serde(default)]
    pub suffixes: SuffixPair,
    /// Abort the stage when the joined table exceeds this many rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl JoinStage {
    /// Join on identically named key columns.
    pub fn on(keys: &[&str], how: JoinKind, suffixes: SuffixPair) -> Self {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        Self {
            left_on: keys.clone(),
            right_on: keys,
            how,
            suffixes,
            max_rows: None,
        }
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn key_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.left_on
            .iter()
            .map(String::as_str)
            .zip(self.right_on.iter().map(String::as_str))
    }

    pub(crate) fn check(&self, name: &str) -> Result<(), String> {
        if self.left_on.is_empty() {
            return Err(format!("join stage '{name}' has no key columns"));
        }
        if self.left_on.len() != self.right_on.len() {
            return Err(format!(
                "join stage '{name}' has {} left keys but {} right keys",
                self.left_on.len(),
                self.right_on.len()
            ));
        }
        if self.suffixes.left == self.suffixes.right {
            return Err(format!(
                "join stage '{name}' uses the same suffix '{}' on both sides",
                self.suffixes.left
            ));
        }
        Ok(())
    }
}

/// Every join stage of the merge, grouped by branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinPlan {
    pub account_loan: JoinStage,
    pub loan_order: JoinStage,
    pub order_transactions: JoinStage,
    pub transactions_disp: JoinStage,
    pub disp_client: JoinStage,
    pub client_card: JoinStage,
    pub reconcile: JoinStage,
}

impl JoinPlan {
    /// Stages in execution order with their configuration names.
    pub fn stages(&self) -> [(&'static str, &JoinStage); 7] {
        [
            ("account_loan", &self.account_loan),
            ("loan_order", &self.loan_order),
            ("order_transactions", &self.order_transactions),
            ("transactions_disp", &self.transactions_disp),
            ("disp_client", &self.disp_client),
            ("client_card", &self.client_card),
            ("reconcile", &self.reconcile),
        ]
    }

    /// Apply one join kind to every stage.
    #[must_use]
    pub fn with_kind(mut self, how: JoinKind) -> Self {
        for stage in [
            &mut self.account_loan,
            &mut self.loan_order,
            &mut self.order_transactions,
            &mut self.transactions_disp,
            &mut self.disp_client,
            &mut self.client_card,
            &mut self.reconcile,
        ] {
            stage.how = how;
        }
        self
    }
}

impl Default for JoinPlan {
    fn default() -> Self {
        let account = ["account_id"];
        let tag = SuffixPair::new;
        Self {
            account_loan: JoinStage::on(&account, JoinKind::Inner, tag("_account", "_loan")),
            loan_order: JoinStage::on(&account, JoinKind::Inner, tag("_loan", "_order")),
            order_transactions: JoinStage::on(
                &account,
                JoinKind::Inner,
                tag("_order", "_transactions"),
            ),
            transactions_disp: JoinStage::on(
                &account,
                JoinKind::Inner,
                tag("_transactions", "_disp"),
            ),
            disp_client: JoinStage::on(&["client_id"], JoinKind::Inner, tag("_disp", "_client")),
            client_card: JoinStage::on(&["disp_id"], JoinKind::Inner, tag("_client_disp", "_card")),
            reconcile: JoinStage::on(&account, JoinKind::Inner, tag("", "_disp_id")),
        }
    }
}

/// The three independent units of work inside the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStage {
    /// Account, loan, order, transactions and disp joined on the account key.
    AccountBranch,
    /// Disp, client and card joined on the client keys.
    ClientBranch,
    /// Client branch joined with the account branch.
    Reconcile,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergeStage::AccountBranch => "account branch",
            MergeStage::ClientBranch => "client branch",
            MergeStage::Reconcile => "reconciliation",
        })
    }
}
