//! An in-process ledger for orchestrator tests

use crate::client::LedgerApi;
use crate::errors::UpstreamCallError;
use async_trait::async_trait;
use closing_common::errors::LedgerError;
use closing_common::types::{Transaction, TransactionId};
use closing_common::Ledger;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Wraps a real [`Ledger`], records the reconcile calls it receives,
/// and fails the ones it's told to with a 500.
pub struct MockLedger {
    pub ledger: Mutex<Ledger>,
    /// Served instead of the live pending list, when set.
    pub listing: Option<Vec<Transaction>>,
    pub fail_ids: HashSet<TransactionId>,
    pub fail_listing: bool,
    pub calls: Mutex<Vec<TransactionId>>,
    /// When set, listing signals `entered` and waits for `release`.
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MockLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            listing: None,
            fail_ids: HashSet::new(),
            fail_listing: false,
            calls: Mutex::new(vec![]),
            gate: None,
        }
    }

    pub fn calls(&self) -> Vec<TransactionId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending_ids(&self) -> Vec<TransactionId> {
        self.ledger
            .lock()
            .unwrap()
            .list_pending()
            .iter()
            .map(|tx| tx.id)
            .collect()
    }
}

fn status_of(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidState { .. } | LedgerError::DuplicateTransaction(_) => {
            StatusCode::CONFLICT
        }
        LedgerError::InvalidCurrency(_) => StatusCode::BAD_REQUEST,
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn pending_transactions(&self) -> Result<Vec<Transaction>, UpstreamCallError> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        if self.fail_listing {
            return Err(UpstreamCallError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "ledger unavailable".to_string(),
            });
        }

        Ok(match &self.listing {
            Some(listing) => listing.clone(),
            None => self.ledger.lock().unwrap().list_pending(),
        })
    }

    async fn reconcile_transaction(&self, id: TransactionId) -> Result<(), UpstreamCallError> {
        self.calls.lock().unwrap().push(id);

        if self.fail_ids.contains(&id) {
            return Err(UpstreamCallError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "simulated failure".to_string(),
            });
        }

        self.ledger
            .lock()
            .unwrap()
            .reconcile(id)
            .map(|_| ())
            .map_err(|err| UpstreamCallError::Status {
                status: status_of(&err),
                message: err.to_string(),
            })
    }
}
