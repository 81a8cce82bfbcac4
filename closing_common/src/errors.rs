use crate::core::types::{TransactionId, TransactionStatus};
use thiserror::Error;

/// **An application-specific error type for ledger operations**
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("Transaction {id} is {status}, expected PENDING")]
    InvalidState {
        id: TransactionId,
        status: TransactionStatus,
    },

    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(TransactionId),

    #[error("Invalid currency code: \"{0}\"")]
    InvalidCurrency(String),
}

pub const EMPTY_TOKEN_MSG: &str = "Bearer token cannot be empty.";
pub const TRANSACTION_ID_NOT_VALID_MSG: &str = "Transaction ID must be a non-negative integer";
