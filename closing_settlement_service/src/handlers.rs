//! Handler functions

use crate::errors::SettlementError;
use crate::orchestrator::SettlementOrchestrator;
use closing_common::api::ErrorBody;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Reply;

/// The `trigger` handler
///
/// Runs a settlement to completion, then acknowledges with 202 and a
/// plain-text summary of the outcome counts.
///
/// - 409 if a run is already in progress;
/// - 502 if the pending transactions couldn't be fetched from the ledger.
///
/// POST /automation/settlement/trigger
pub async fn trigger(
    orchestrator: Arc<SettlementOrchestrator>,
) -> Result<impl Reply, Infallible> {
    log::debug!("trigger");

    let reply = match orchestrator.run_settlement().await {
        Ok(report) => warp::reply::with_status(
            format!("Settlement process triggered. {}.", report.summary()),
            StatusCode::ACCEPTED,
        ),
        Err(err @ SettlementError::AlreadyRunning) => {
            warp::reply::with_status(err.to_string(), StatusCode::CONFLICT)
        }
        Err(err @ SettlementError::Upstream(_)) => {
            warp::reply::with_status(err.to_string(), StatusCode::BAD_GATEWAY)
        }
    };

    Ok(reply)
}

/// The `last_report` handler
///
/// Responds with the report of the most recent completed run, or 404
/// if there hasn't been one.
///
/// GET /automation/settlement/last
pub async fn last_report(
    orchestrator: Arc<SettlementOrchestrator>,
) -> Result<impl Reply, Infallible> {
    log::debug!("last_report");

    let reply = match orchestrator.last_report().await {
        Some(report) => warp::reply::with_status(warp::reply::json(&report), StatusCode::OK),
        None => warp::reply::with_status(
            warp::reply::json(&ErrorBody::new(
                StatusCode::NOT_FOUND.as_u16(),
                "No settlement run has completed yet",
                "not_found",
            )),
            StatusCode::NOT_FOUND,
        ),
    };

    Ok(reply)
}
