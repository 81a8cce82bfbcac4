use closing_common::api::ErrorBody;
use closing_common::auth::Capability;
use closing_common::errors::LedgerError;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

#[derive(Debug)]
pub struct WebServiceLedgerError(pub LedgerError);

impl Reject for WebServiceLedgerError {}

/// Missing, malformed, or unknown bearer token.
#[derive(Debug)]
pub struct WebServiceUnauthorized;

impl Reject for WebServiceUnauthorized {}

/// A known principal without the required capability.
#[derive(Debug)]
pub struct WebServiceForbidden(pub Capability);

impl Reject for WebServiceForbidden {}

fn ledger_error_status(err: &LedgerError) -> (StatusCode, &'static str) {
    match err {
        LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        LedgerError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
        LedgerError::DuplicateTransaction(_) => (StatusCode::CONFLICT, "duplicate"),
        LedgerError::InvalidCurrency(_) => (StatusCode::BAD_REQUEST, "bad_request"),
    }
}

/// **Turns rejections into JSON error responses**
///
/// `{"error": {"code": ..., "message": ..., "type": ...}}`
pub async fn recover(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message, kind) = if let Some(WebServiceLedgerError(ledger_err)) =
        err.find::<WebServiceLedgerError>()
    {
        let (code, kind) = ledger_error_status(ledger_err);
        (code, ledger_err.to_string(), kind)
    } else if err.find::<WebServiceUnauthorized>().is_some()
        || err.find::<warp::reject::InvalidHeader>().is_some()
    {
        (
            StatusCode::UNAUTHORIZED,
            "Missing or invalid bearer token".to_string(),
            "unauthorized",
        )
    } else if let Some(WebServiceForbidden(capability)) = err.find::<WebServiceForbidden>()
    {
        (
            StatusCode::FORBIDDEN,
            format!("Capability required: {}", capability),
            "forbidden",
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string(), "not_found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
            "method_not_allowed",
        )
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
            "internal_error",
        )
    };

    let body = ErrorBody::new(code.as_u16(), message, kind);
    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}
