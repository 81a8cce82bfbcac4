pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;

use closing_common::Ledger;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The ledger, shared between request handlers.
pub type SharedLedger = Arc<Mutex<Ledger>>;
