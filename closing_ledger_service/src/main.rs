//! The "Ledger Web Service's" entry point.

use closing_common::Ledger;
use closing_ledger_service::config::Config;
use closing_ledger_service::routes::routes;
use std::env;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use warp::Filter;

/// The "Ledger Web Service's" entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "closing=info");
    }
    pretty_env_logger::init();

    let config = Config::from_env()?;
    config.validate()?;

    let ledger = if config.ledger.seed_fixtures {
        Ledger::with_fixtures()
    } else {
        Ledger::empty()
    };
    log::info!(
        "Ledger loaded with {} pending transactions.",
        ledger.list_pending().len()
    );

    let access_log = warp::log("closing::ledger");
    let routes = routes(Arc::new(Mutex::new(ledger)), config.authorizer()).with(access_log);

    let addr = config.server.socket_addr()?;
    log::info!("Ledger service listening on {}", addr);

    // Start up the server
    warp::serve(routes).run(addr).await;

    Ok(())
}
