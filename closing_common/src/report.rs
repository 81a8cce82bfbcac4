//! The outcome of a settlement run

use crate::core::types::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// **What happened to a single transaction during a run**
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Reconciled,
    /// The reconcile call failed; the transaction is still pending.
    Failed { reason: String },
    /// Someone else reconciled it between listing and reconciling.
    Skipped { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemOutcome {
    pub id: TransactionId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// **Aggregate report of one settlement run**
///
/// Outcomes are kept in processing order, which is the order
/// the ledger listed the pending transactions in.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SettlementReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<ItemOutcome>,
}

impl SettlementReport {
    /// Starts a new report, stamped now.
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: vec![],
        }
    }

    pub fn record(&mut self, id: TransactionId, outcome: Outcome) {
        self.outcomes.push(ItemOutcome { id, outcome });
    }

    /// Stamps the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn reconciled(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Reconciled))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// `true` if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Ids that failed, in processing order.
    pub fn failed_ids(&self) -> Vec<TransactionId> {
        self.outcomes
            .iter()
            .filter(|item| matches!(item.outcome, Outcome::Failed { .. }))
            .map(|item| item.id)
            .collect()
    }

    /// One line, e.g. `2 reconciled, 0 failed, 0 skipped of 2`.
    pub fn summary(&self) -> String {
        format!(
            "{} reconciled, {} failed, {} skipped of {}",
            self.reconciled(),
            self.failed(),
            self.skipped(),
            self.total()
        )
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|item| pred(&item.outcome)).count()
    }
}
