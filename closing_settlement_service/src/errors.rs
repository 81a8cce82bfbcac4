use reqwest::StatusCode;
use thiserror::Error;

/// **A failed call to the ledger service**
#[derive(Debug, Error)]
pub enum UpstreamCallError {
    #[error("Ledger request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Ledger request timed out")]
    Timeout,

    #[error("Ledger responded {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Could not decode ledger response: {0}")]
    Decode(String),

    #[error("Invalid ledger URL: {0}")]
    Url(String),

    #[error("Could not obtain service credentials: {0}")]
    Credentials(String),
}

impl UpstreamCallError {
    /// The ledger refused because the transaction is no longer pending.
    pub fn is_conflict(&self) -> bool {
        matches!(self, UpstreamCallError::Status { status, .. } if *status == StatusCode::CONFLICT)
    }
}

impl From<reqwest::Error> for UpstreamCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamCallError::Timeout
        } else if err.is_decode() {
            UpstreamCallError::Decode(err.to_string())
        } else {
            UpstreamCallError::Transport(err)
        }
    }
}

/// **Why a settlement run didn't produce a report**
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Could not fetch pending transactions: {0}")]
    Upstream(#[from] UpstreamCallError),

    #[error("A settlement run is already in progress")]
    AlreadyRunning,
}
