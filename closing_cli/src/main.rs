//! The "Financial Closing CLI" app's entry point.

use closing_cli::logic::{get_base_url, main_loop, token_from_env};
use closing_cli::{DEFAULT_LEDGER_URL, DEFAULT_SETTLEMENT_URL};
use std::env;
use std::error::Error;

/// The "Financial Closing CLI" app's entry point.
///
/// `closing_cli [ledger base URL] [settlement base URL]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "closing=warn");
    }
    pretty_env_logger::init();

    let ledger_url = get_base_url(env::args().nth(1), DEFAULT_LEDGER_URL)?;
    let settlement_url = get_base_url(env::args().nth(2), DEFAULT_SETTLEMENT_URL)?;

    main_loop(ledger_url, settlement_url, token_from_env()).await?;

    Ok(())
}
