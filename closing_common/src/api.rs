//! Paths and bodies shared by the services and their clients
//!
//! Paths are relative, so they can be joined onto a base URL.

use crate::core::types::TransactionId;
use serde::{Deserialize, Serialize};

pub const PENDING_PATH: &str = "v1/transactions/pending";
pub const TRIGGER_PATH: &str = "automation/settlement/trigger";
pub const LAST_REPORT_PATH: &str = "automation/settlement/last";

pub fn transaction_path(id: TransactionId) -> String {
    format!("v1/transactions/{id}")
}

pub fn reconcile_path(id: TransactionId) -> String {
    format!("v1/transactions/{id}/reconcile")
}

/// **JSON error body returned by the ledger service**
///
/// `{"error": {"code": 404, "message": "...", "type": "not_found"}}`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorBody {
    pub fn new(code: u16, message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
                kind: kind.into(),
            },
        }
    }
}
