//! Handler functions

use crate::errors::{WebServiceForbidden, WebServiceLedgerError, WebServiceUnauthorized};
use crate::SharedLedger;
use closing_common::auth::{bearer_token, Authorizer, Capability, Principal};
use closing_common::types::TransactionId;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// **Capability check for a request**
///
/// Resolves the `Authorization` header to a principal and asks the
/// authorizer whether that principal holds `capability`.
///
/// Authorizers that don't require a token let every request through
/// as the anonymous principal.
pub fn check_capability(
    authorizer: &dyn Authorizer,
    header: Option<&str>,
    capability: Capability,
) -> Result<Principal, Rejection> {
    if !authorizer.requires_token() {
        return Ok(Principal::anonymous());
    }

    let principal = header
        .and_then(bearer_token)
        .and_then(|token| authorizer.authenticate(token))
        .ok_or_else(|| {
            log::warn!("Rejected request without a valid bearer token.");
            warp::reject::custom(WebServiceUnauthorized)
        })?;

    if authorizer.authorize(&principal, capability) {
        Ok(principal)
    } else {
        log::warn!("Principal \"{}\" lacks capability {}.", principal, capability);
        Err(warp::reject::custom(WebServiceForbidden(capability)))
    }
}

/// Async wrapper around [`check_capability`], for use in filters.
pub async fn authorize(
    header: Option<String>,
    authorizer: Arc<dyn Authorizer>,
    capability: Capability,
) -> Result<Principal, Rejection> {
    check_capability(authorizer.as_ref(), header.as_deref(), capability)
}

/// The `list_pending` handler
///
/// Responds with all pending transactions, ascending by id.
///
/// GET /v1/transactions/pending
pub async fn list_pending(
    principal: Principal,
    ledger: SharedLedger,
) -> Result<impl Reply, Infallible> {
    log::debug!("list_pending; principal = {}", principal);
    let pending = ledger.lock().await.list_pending();
    Ok(warp::reply::json(&pending))
}

/// The `transaction` handler
///
/// GET /v1/transactions/{id}
pub async fn transaction(
    id: TransactionId,
    principal: Principal,
    ledger: SharedLedger,
) -> Result<impl Reply, Rejection> {
    log::debug!("transaction; id = {}, principal = {}", id, principal);

    match ledger.lock().await.get(id) {
        Ok(tx) => Ok(warp::reply::json(&tx)),
        Err(ledger_err) => Err(warp::reject::custom(WebServiceLedgerError(ledger_err))),
    }
}

/// The `reconcile` handler
///
/// Responds with an empty 200 on success.
///
/// POST /v1/transactions/{id}/reconcile
pub async fn reconcile(
    id: TransactionId,
    principal: Principal,
    ledger: SharedLedger,
) -> Result<impl Reply, Rejection> {
    log::info!("Transaction {} reconciliation requested by \"{}\".", id, principal);

    match ledger.lock().await.reconcile(id) {
        Ok(_) => Ok(StatusCode::OK),
        Err(ledger_err) => {
            log::warn!("Reconciliation of transaction {} refused: {}", id, ledger_err);
            Err(warp::reject::custom(WebServiceLedgerError(ledger_err)))
        }
    }
}
