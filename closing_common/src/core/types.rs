use crate::errors::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, immutable transaction identifier.
pub type TransactionId = u64;

/// **Status of a transaction in the closing process**
///
/// Serialized in upper case, e.g. `"PENDING"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Awaiting reconciliation
    Pending,
    /// Matched against external records; terminal
    Reconciled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Reconciled => write!(f, "RECONCILED"),
        }
    }
}

/// **A three-letter ISO 4217 currency code**
///
/// Always stored in upper case. Parsing rejects anything that isn't
/// exactly three ASCII letters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// For codes known to be valid at compile time.
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()));
        CurrencyCode(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = LedgerError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(code.to_ascii_uppercase()))
        } else {
            Err(LedgerError::InvalidCurrency(code.to_string()))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = LedgerError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// **A ledger transaction**
///
/// The `amount` is an exact decimal. On the wire it is a JSON number,
/// as the ledger's clients expect, written with every digit and its scale.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Creates a new pending transaction.
    pub fn new(id: TransactionId, amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            id,
            amount,
            currency,
            status: TransactionStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}
