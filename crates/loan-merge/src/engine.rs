//! Two-branch merge of the normalized bronze tables.

use loan_model::{JoinPlan, JoinStage, MergeStage};
use polars::prelude::DataFrame;
use tracing::{Span, debug, error, info, info_span};

use crate::error::MergeError;
use crate::join::join_tables;

/// The seven normalized tables the merge consumes. District is not merged.
#[derive(Debug, Clone)]
pub struct BronzeTables {
    pub account: DataFrame,
    pub card: DataFrame,
    pub client: DataFrame,
    pub disp: DataFrame,
    pub loan: DataFrame,
    pub order: DataFrame,
    pub transactions: DataFrame,
}

/// Runs a [`JoinPlan`] against a set of bronze tables.
///
/// Log output is attached to a `merge` span created under the caller's span,
/// so every event carries the run context.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    plan: JoinPlan,
    span: Span,
}

impl MergeEngine {
    pub fn new(plan: &JoinPlan, parent: &Span) -> Self {
        Self {
            plan: plan.clone(),
            span: info_span!(parent: parent, "merge"),
        }
    }

    /// Build the silver table.
    ///
    /// The account and client branches are built independently and then
    /// reconciled on the account key. A failure in any unit aborts the merge.
    pub fn merge(&self, tables: BronzeTables) -> Result<DataFrame, MergeError> {
        let _guard = self.span.enter();
        let BronzeTables {
            account,
            card,
            client,
            disp,
            loan,
            order,
            transactions,
        } = tables;

        let account_branch = self.run_stage(
            MergeStage::AccountBranch,
            account,
            [
                ("account_loan", &self.plan.account_loan, loan),
                ("loan_order", &self.plan.loan_order, order),
                ("order_transactions", &self.plan.order_transactions, transactions),
                ("transactions_disp", &self.plan.transactions_disp, disp.clone()),
            ],
        )?;

        let client_branch = self.run_stage(
            MergeStage::ClientBranch,
            disp,
            [
                ("disp_client", &self.plan.disp_client, client),
                ("client_card", &self.plan.client_card, card),
            ],
        )?;

        let silver = self.run_stage(
            MergeStage::Reconcile,
            client_branch,
            [("reconcile", &self.plan.reconcile, account_branch)],
        )?;

        info!(
            rows = silver.height(),
            columns = silver.width(),
            "silver table merged"
        );
        Ok(silver)
    }

    fn run_stage<const N: usize>(
        &self,
        stage: MergeStage,
        base: DataFrame,
        steps: [(&'static str, &JoinStage, DataFrame); N],
    ) -> Result<DataFrame, MergeError> {
        let mut current = base;
        for (step, join, right) in steps {
            let right_rows = right.height();
            let left_rows = current.height();
            current = join_tables(current, right, join).map_err(|source| {
                error!(%stage, step, error = %source, "merge failed");
                MergeError::new(stage, step, source)
            })?;
            debug!(
                %stage,
                step,
                how = ?join.how,
                left_rows,
                right_rows,
                rows = current.height(),
                "join complete"
            );
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn tables() -> BronzeTables {
        BronzeTables {
            account: df!("account_id" => [1i64], "district_id" => [10i64]).unwrap(),
            card: df!("card_id" => [600i64], "disp_id" => [400i64], "type" => ["classic"]).unwrap(),
            client: df!("client_id" => [500i64], "district_id" => [10i64]).unwrap(),
            disp: df!(
                "disp_id" => [400i64],
                "client_id" => [500i64],
                "account_id" => [1i64],
                "type" => ["OWNER"]
            )
            .unwrap(),
            loan: df!("loan_id" => [700i64], "account_id" => [1i64]).unwrap(),
            order: df!("order_id" => [800i64], "account_id" => [1i64]).unwrap(),
            transactions: df!("trans_id" => [900i64], "account_id" => [1i64]).unwrap(),
        }
    }

    #[test]
    fn single_account_merges_to_one_row() {
        let engine = MergeEngine::new(&JoinPlan::default(), &Span::none());

        let silver = engine.merge(tables()).unwrap();

        assert_eq!(silver.height(), 1);
        assert!(silver.column("disp_id_disp_id").is_ok());
        assert!(silver.column("district_id_disp_id").is_ok());
        assert!(silver.column("type_card").is_ok());
    }

    #[test]
    fn failure_names_the_branch() {
        let mut input = tables();
        input.card = df!("card_id" => [600i64]).unwrap();
        let engine = MergeEngine::new(&JoinPlan::default(), &Span::none());

        let err = engine.merge(input).unwrap_err();

        assert_eq!(err.stage, MergeStage::ClientBranch);
        assert_eq!(err.step, "client_card");
    }
}
