use crate::client::LedgerApi;
use crate::errors::SettlementError;
use closing_common::{Outcome, SettlementReport};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// **Runs settlements against the ledger**
///
/// A run fetches the pending transactions once and reconciles them one by
/// one, in the order the ledger listed them. A failed item doesn't stop
/// the run; it is recorded in the report and the next item is processed.
///
/// Only one run at a time: a run started while another is in progress
/// fails with [`SettlementError::AlreadyRunning`].
pub struct SettlementOrchestrator {
    ledger: Arc<dyn LedgerApi>,
    run_lock: Mutex<()>,
    last_report: RwLock<Option<SettlementReport>>,
}

impl SettlementOrchestrator {
    pub fn new(ledger: Arc<dyn LedgerApi>) -> Self {
        Self {
            ledger,
            run_lock: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    /// **Performs one settlement run**
    ///
    /// # Errors
    /// - Another run is in progress, `SettlementError::AlreadyRunning`;
    /// - The pending list couldn't be fetched, `SettlementError::Upstream`.
    ///   Nothing was reconciled in that case.
    pub async fn run_settlement(&self) -> Result<SettlementReport, SettlementError> {
        let _running = self.run_lock.try_lock().map_err(|_| {
            log::warn!("Settlement run requested while another one is in progress.");
            SettlementError::AlreadyRunning
        })?;

        log::info!("Starting automated settlement process using service account...");

        let pending = self.ledger.pending_transactions().await.map_err(|err| {
            log::error!("Failed to execute settlement process: {}", err);
            SettlementError::Upstream(err)
        })?;
        log::info!("Found {} pending transactions to process.", pending.len());

        let mut report = SettlementReport::start();

        for tx in &pending {
            log::info!("Processing reconciliation for transaction ID: {}", tx.id);

            let outcome = match self.ledger.reconcile_transaction(tx.id).await {
                Ok(()) => Outcome::Reconciled,
                Err(err) if err.is_conflict() => {
                    log::warn!("Transaction {} skipped: {}", tx.id, err);
                    Outcome::Skipped {
                        reason: err.to_string(),
                    }
                }
                Err(err) => {
                    log::error!("Transaction {} failed: {}", tx.id, err);
                    Outcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };

            report.record(tx.id, outcome);
        }

        let report = report.finish();

        if report.is_clean() {
            log::info!(
                "Settlement process completed successfully: {}.",
                report.summary()
            );
        } else {
            log::warn!(
                "Settlement process completed with failures: {}; failed ids: {:?}.",
                report.summary(),
                report.failed_ids()
            );
        }

        *self.last_report.write().await = Some(report.clone());

        Ok(report)
    }

    /// The report of the most recent completed run.
    pub async fn last_report(&self) -> Option<SettlementReport> {
        self.last_report.read().await.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }
}
