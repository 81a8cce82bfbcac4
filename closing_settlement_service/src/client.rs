//! The orchestrator's view of the ledger service

use crate::credentials::CredentialProvider;
use crate::errors::UpstreamCallError;
use async_trait::async_trait;
use closing_common::api::{reconcile_path, ErrorBody, PENDING_PATH};
use closing_common::types::{Transaction, TransactionId};
use reqwest::{Client, RequestBuilder, Response, Url};
use std::sync::Arc;
use std::time::Duration;

/// **The ledger operations a settlement run needs**
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// GET /v1/transactions/pending
    async fn pending_transactions(&self) -> Result<Vec<Transaction>, UpstreamCallError>;

    /// POST /v1/transactions/{id}/reconcile
    async fn reconcile_transaction(&self, id: TransactionId) -> Result<(), UpstreamCallError>;
}

/// **Parses a base URL, making sure relative paths join under it**
///
/// `http://host/api` becomes `http://host/api/`, so that joining
/// `v1/transactions/pending` keeps the `api` segment.
pub fn parse_base_url(base_url: &str) -> Result<Url, UpstreamCallError> {
    let mut url = Url::parse(base_url).map_err(|err| UpstreamCallError::Url(err.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// **HTTP client for the ledger service**
///
/// Every call carries the service credential and is bounded by the
/// configured timeout.
pub struct LedgerClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl LedgerClient {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, UpstreamCallError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("closing_settlement_service")
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn url(&self, path: &str) -> Result<Url, UpstreamCallError> {
        self.base_url
            .join(path)
            .map_err(|err| UpstreamCallError::Url(err.to_string()))
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, UpstreamCallError> {
        Ok(match self.credentials.bearer_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// Turns non-success responses into [`UpstreamCallError::Status`],
    /// using the ledger's error message when the body has one.
    async fn check(response: Response) -> Result<Response, UpstreamCallError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error.message,
            Err(_) => text,
        };

        Err(UpstreamCallError::Status { status, message })
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn pending_transactions(&self) -> Result<Vec<Transaction>, UpstreamCallError> {
        let url = self.url(PENDING_PATH)?;
        let request = self.authorized(self.client.get(url)).await?;

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn reconcile_transaction(&self, id: TransactionId) -> Result<(), UpstreamCallError> {
        let url = self.url(&reconcile_path(id))?;
        let request = self.authorized(self.client.post(url)).await?;

        Self::check(request.send().await?).await?;
        Ok(())
    }
}
