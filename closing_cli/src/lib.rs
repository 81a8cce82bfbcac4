pub mod logic;

pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:8080/";
pub const DEFAULT_SETTLEMENT_URL: &str = "http://127.0.0.1:8081/";

/// Name of the environment variable holding the bearer token for the ledger.
pub const TOKEN_VAR: &str = "CLOSING_TOKEN";
