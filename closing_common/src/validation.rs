use crate::core::types::TransactionId;
use crate::errors::{EMPTY_TOKEN_MSG, TRANSACTION_ID_NOT_VALID_MSG};

/// **Basic input validation for a transaction id typed by a user**
///
/// Returns the parsed id, or a message explaining what's wrong.
pub fn parse_transaction_id(word: &str) -> Result<TransactionId, String> {
    word.trim()
        .parse::<TransactionId>()
        .map_err(|_| format!("{}; you provided '{}'.", TRANSACTION_ID_NOT_VALID_MSG, word))
}

/// **Basic input validation for a bearer token**
///
/// Checks for:
/// - An empty string.
pub fn is_valid_token(token: &str) -> Option<&'static str> {
    if token.trim().is_empty() {
        Some(EMPTY_TOKEN_MSG)
    } else {
        None
    }
}
