pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod store;
pub mod validation;

pub use crate::core::types;
pub use ledger::Ledger;
pub use report::{ItemOutcome, Outcome, SettlementReport};
