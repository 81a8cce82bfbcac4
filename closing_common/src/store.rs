//! Data sources for the ledger
//!
//! The ledger never owns its records directly; it goes through a
//! [`TransactionStore`], so that tests and deployments can inject
//! whatever fixtures or backing storage they need.

use crate::core::types::{Transaction, TransactionId, TransactionStatus};
use crate::errors::LedgerError;
use std::collections::BTreeMap;

/// **Storage for ledger transactions**
///
/// Implementations must keep ids unique, and must return pending
/// transactions in a stable order.
pub trait TransactionStore: Send + Sync {
    /// Records a new transaction.
    ///
    /// # Errors
    /// - A transaction with the same id exists, `LedgerError::DuplicateTransaction`
    fn insert(&mut self, tx: Transaction) -> Result<(), LedgerError>;

    /// Looks up a single transaction.
    fn get(&self, id: TransactionId) -> Option<&Transaction>;

    /// All transactions currently in [`TransactionStatus::Pending`], ascending by id.
    fn pending(&self) -> Vec<Transaction>;

    /// Overwrites the status of an existing transaction.
    ///
    /// # Errors
    /// - No such transaction, `LedgerError::NotFound`
    fn set_status(
        &mut self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Transaction, LedgerError>;
}

/// **An in-memory store keyed by transaction id**
///
/// Iteration order of the underlying map is ascending by id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl InMemoryStore {
    /// Returns an empty instance of the [`InMemoryStore`] type
    pub fn new() -> Self {
        InMemoryStore {
            transactions: BTreeMap::new(),
        }
    }

    /// Builds a store from fixtures.
    ///
    /// # Errors
    /// - Two fixtures share an id, `LedgerError::DuplicateTransaction`
    pub fn with_transactions(
        transactions: impl IntoIterator<Item = Transaction>,
    ) -> Result<Self, LedgerError> {
        let mut store = Self::new();
        for tx in transactions {
            store.insert(tx)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Collects transactions keyed by id; a later duplicate replaces an earlier one.
impl FromIterator<Transaction> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        InMemoryStore {
            transactions: iter.into_iter().map(|tx| (tx.id, tx)).collect(),
        }
    }
}

impl TransactionStore for InMemoryStore {
    fn insert(&mut self, tx: Transaction) -> Result<(), LedgerError> {
        if self.transactions.contains_key(&tx.id) {
            return Err(LedgerError::DuplicateTransaction(tx.id));
        }
        self.transactions.insert(tx.id, tx);
        Ok(())
    }

    fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    fn pending(&self) -> Vec<Transaction> {
        self.transactions
            .values()
            .filter(|tx| tx.is_pending())
            .cloned()
            .collect()
    }

    fn set_status(
        &mut self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Transaction, LedgerError> {
        let tx = self
            .transactions
            .get_mut(&id)
            .ok_or(LedgerError::NotFound(id))?;
        tx.status = status;
        Ok(tx.clone())
    }
}
