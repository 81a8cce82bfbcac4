//! Route filters of the ledger service

use crate::errors::recover;
use crate::handlers;
use crate::SharedLedger;
use closing_common::auth::{Authorizer, Capability, Principal};
use closing_common::types::TransactionId;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

fn with_ledger(
    ledger: SharedLedger,
) -> impl Filter<Extract = (SharedLedger,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || ledger.clone())
}

/// Extracts the principal, or rejects with 401/403.
fn authorized(
    authorizer: Arc<dyn Authorizer>,
    capability: Capability,
) -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        handlers::authorize(header, authorizer.clone(), capability)
    })
}

/// **All ledger routes, with JSON error recovery**
pub fn routes(
    ledger: SharedLedger,
    authorizer: Arc<dyn Authorizer>,
) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
    let list_pending = warp::path!("v1" / "transactions" / "pending")
        .and(warp::get())
        .and(authorized(authorizer.clone(), Capability::ViewTransactions))
        .and(with_ledger(ledger.clone()))
        .and_then(handlers::list_pending);

    let transaction = warp::path!("v1" / "transactions" / TransactionId)
        .and(warp::get())
        .and(authorized(authorizer.clone(), Capability::ViewTransactions))
        .and(with_ledger(ledger.clone()))
        .and_then(handlers::transaction);

    let reconcile = warp::path!("v1" / "transactions" / TransactionId / "reconcile")
        .and(warp::post())
        .and(authorized(authorizer, Capability::ExecuteReconciliation))
        .and(with_ledger(ledger))
        .and_then(handlers::reconcile);

    list_pending.or(transaction).or(reconcile).recover(recover)
}

#[cfg(test)]
mod tests {
    use super::routes;
    use crate::SharedLedger;
    use closing_common::auth::{AllowAll, Authorizer, Capability, StaticTokenAuthorizer, TokenGrant};
    use closing_common::types::{Transaction, TransactionStatus};
    use closing_common::Ledger;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use warp::http::{HeaderValue, StatusCode};

    fn ledger() -> SharedLedger {
        Arc::new(Mutex::new(Ledger::with_fixtures()))
    }

    fn secured() -> Arc<dyn Authorizer> {
        Arc::new(StaticTokenAuthorizer::new([
            TokenGrant {
                token: "viewer".to_string(),
                principal: "auditor".to_string(),
                capabilities: vec![Capability::ViewTransactions],
            },
            TokenGrant {
                token: "service".to_string(),
                principal: "settlement-service".to_string(),
                capabilities: vec![
                    Capability::ViewTransactions,
                    Capability::ExecuteReconciliation,
                ],
            },
        ]))
    }

    #[tokio::test]
    async fn pending_lists_fixtures() {
        let api = routes(ledger(), Arc::new(AllowAll));

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/pending")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::OK, res.status());
        let pending: Vec<Transaction> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(2, pending.len());
        assert_eq!(1, pending[0].id);
        assert_eq!(dec!(1500.0), pending[0].amount);
        assert_eq!(2, pending[1].id);
        assert_eq!(dec!(3200.50), pending[1].amount);
        assert!(pending.iter().all(|tx| tx.status == TransactionStatus::Pending));
    }

    #[tokio::test]
    async fn reconcile_then_reconcile_again_conflicts() {
        let ledger = ledger();
        let api = routes(ledger.clone(), Arc::new(AllowAll));

        let first = warp::test::request()
            .method("POST")
            .path("/v1/transactions/1/reconcile")
            .reply(&api)
            .await;
        assert_eq!(StatusCode::OK, first.status());
        assert!(first.body().is_empty());
        assert_eq!(
            TransactionStatus::Reconciled,
            ledger.lock().await.get(1).unwrap().status
        );

        let second = warp::test::request()
            .method("POST")
            .path("/v1/transactions/1/reconcile")
            .reply(&api)
            .await;
        assert_eq!(StatusCode::CONFLICT, second.status());
        let body: serde_json::Value = serde_json::from_slice(second.body()).unwrap();
        assert_eq!(body["error"]["code"], 409);
        assert_eq!(body["error"]["type"], "invalid_state");
    }

    #[tokio::test]
    async fn reconcile_unknown_is_not_found() {
        let api = routes(ledger(), Arc::new(AllowAll));

        let res = warp::test::request()
            .method("POST")
            .path("/v1/transactions/77/reconcile")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"]["message"], "Transaction not found: 77");
    }

    #[tokio::test]
    async fn single_transaction() {
        let api = routes(ledger(), Arc::new(AllowAll));

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/2")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::OK, res.status());
        let tx: Transaction = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(2, tx.id);
        assert_eq!("BRL", tx.currency.as_str());
    }

    #[tokio::test]
    async fn pending_empty_after_reconciling_all() {
        let api = routes(ledger(), Arc::new(AllowAll));

        for id in [1, 2] {
            let res = warp::test::request()
                .method("POST")
                .path(&format!("/v1/transactions/{id}/reconcile"))
                .reply(&api)
                .await;
            assert_eq!(StatusCode::OK, res.status());
        }

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/pending")
            .reply(&api)
            .await;
        let pending: Vec<Transaction> = serde_json::from_slice(res.body()).unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let api = routes(ledger(), secured());

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/pending")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    }

    #[tokio::test]
    async fn unreadable_authorization_header_is_unauthorized() {
        let api = routes(ledger(), secured());

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/pending")
            .header(
                "authorization",
                HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
            )
            .reply(&api)
            .await;

        assert_eq!(StatusCode::UNAUTHORIZED, res.status());
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"]["code"], 401);
        assert_eq!(body["error"]["type"], "unauthorized");
    }

    #[tokio::test]
    async fn view_capability_cannot_reconcile() {
        let ledger = ledger();
        let api = routes(ledger.clone(), secured());

        let res = warp::test::request()
            .method("POST")
            .path("/v1/transactions/1/reconcile")
            .header("authorization", "Bearer viewer")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::FORBIDDEN, res.status());
        assert!(ledger.lock().await.get(1).unwrap().is_pending());

        let res = warp::test::request()
            .method("GET")
            .path("/v1/transactions/pending")
            .header("authorization", "Bearer viewer")
            .reply(&api)
            .await;
        assert_eq!(StatusCode::OK, res.status());
    }

    #[tokio::test]
    async fn service_token_can_reconcile() {
        let api = routes(ledger(), secured());

        let res = warp::test::request()
            .method("POST")
            .path("/v1/transactions/2/reconcile")
            .header("authorization", "Bearer service")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::OK, res.status());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let api = routes(ledger(), Arc::new(AllowAll));

        let res = warp::test::request()
            .method("GET")
            .path("/v1/accounts")
            .reply(&api)
            .await;

        assert_eq!(StatusCode::NOT_FOUND, res.status());
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"]["type"], "not_found");
    }
}
