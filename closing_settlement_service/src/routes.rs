//! Route filters of the settlement service

use crate::handlers;
use crate::orchestrator::SettlementOrchestrator;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

fn with_orchestrator(
    orchestrator: Arc<SettlementOrchestrator>,
) -> impl Filter<Extract = (Arc<SettlementOrchestrator>,), Error = Infallible> + Clone {
    warp::any().map(move || orchestrator.clone())
}

pub fn routes(
    orchestrator: Arc<SettlementOrchestrator>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let trigger = warp::path!("automation" / "settlement" / "trigger")
        .and(warp::post())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(handlers::trigger);

    let last_report = warp::path!("automation" / "settlement" / "last")
        .and(warp::get())
        .and(with_orchestrator(orchestrator))
        .and_then(handlers::last_report);

    trigger.or(last_report)
}
