//! The "Settlement Web Service's" entry point.

use closing_settlement_service::client::{parse_base_url, LedgerClient};
use closing_settlement_service::config::Config;
use closing_settlement_service::orchestrator::SettlementOrchestrator;
use closing_settlement_service::routes::routes;
use closing_settlement_service::scheduler::SettlementScheduler;
use std::env;
use std::error::Error;
use std::sync::Arc;
use warp::Filter;

/// The "Settlement Web Service's" entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "closing=info");
    }
    pretty_env_logger::init();

    let config = Config::from_env()?;
    config.validate()?;

    let base_url = parse_base_url(&config.ledger.base_url)?;
    log::info!("Ledger service at {}", base_url);

    let credentials = config.credential_provider()?;
    let ledger = LedgerClient::new(base_url, config.ledger.timeout(), credentials)?;
    let orchestrator = Arc::new(SettlementOrchestrator::new(Arc::new(ledger)));

    if let Some(period) = config.settlement.interval() {
        SettlementScheduler::new(orchestrator.clone(), period).start();
    }

    let access_log = warp::log("closing::settlement");
    let routes = routes(orchestrator).with(access_log);

    let addr = config.server.socket_addr()?;
    log::info!("Settlement service listening on {}", addr);

    // Start up the server
    warp::serve(routes).run(addr).await;

    Ok(())
}
