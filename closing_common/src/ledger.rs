use crate::core::types::{CurrencyCode, Transaction, TransactionId, TransactionStatus};
use crate::errors::LedgerError;
use crate::store::{InMemoryStore, TransactionStore};
use rust_decimal_macros::dec;

/// Holds the transactions awaiting reconciliation, and performs reconciliation.
///
/// Performs no authorization of its own; callers gate access.
pub struct Ledger {
    store: Box<dyn TransactionStore>,
}

impl Ledger {
    /// **Creates a ledger backed by the given store.**
    pub fn new(store: impl TransactionStore + 'static) -> Self {
        Ledger {
            store: Box::new(store),
        }
    }

    /// **Creates an in-memory ledger without any data.**
    pub fn empty() -> Self {
        Self::new(InMemoryStore::new())
    }

    /// **Creates an in-memory ledger seeded with the reference transactions**
    ///
    /// Two pending BRL transactions: id 1 for 1500.00 and id 2 for 3200.50.
    pub fn with_fixtures() -> Self {
        Self::new(fixtures().into_iter().collect::<InMemoryStore>())
    }

    /// **Records a new transaction**
    ///
    /// # Errors
    /// - The id is already taken, `LedgerError::DuplicateTransaction`
    pub fn record(&mut self, tx: Transaction) -> Result<(), LedgerError> {
        log::debug!("Recording transaction {} ({} {})", tx.id, tx.amount, tx.currency);
        self.store.insert(tx)
    }

    /// **Lists all pending transactions**
    ///
    /// Ordered ascending by id.
    pub fn list_pending(&self) -> Vec<Transaction> {
        self.store.pending()
    }

    /// **Retrieves a single transaction**
    ///
    /// # Errors
    /// - No such transaction, `LedgerError::NotFound`
    pub fn get(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.store.get(id).cloned().ok_or(LedgerError::NotFound(id))
    }

    /// **Reconciles a pending transaction**
    ///
    /// Moves it from `PENDING` to `RECONCILED`. Reconciling twice is an error,
    /// not a no-op.
    ///
    /// # Errors
    /// - No such transaction, `LedgerError::NotFound`;
    /// - The transaction isn't pending, `LedgerError::InvalidState`.
    pub fn reconcile(&mut self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let current = self.store.get(id).ok_or(LedgerError::NotFound(id))?;

        if !current.is_pending() {
            return Err(LedgerError::InvalidState {
                id,
                status: current.status,
            });
        }

        let reconciled = self.store.set_status(id, TransactionStatus::Reconciled)?;
        log::info!("Transaction {} reconciled.", id);
        Ok(reconciled)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::empty()
    }
}

/// The reference set of pending transactions.
pub fn fixtures() -> Vec<Transaction> {
    let brl = CurrencyCode::from_static("BRL");
    vec![
        Transaction::new(1, dec!(1500.00), brl.clone()),
        Transaction::new(2, dec!(3200.50), brl),
    ]
}
