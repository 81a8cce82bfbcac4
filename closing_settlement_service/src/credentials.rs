//! Service-identity credentials for calls to the ledger
//!
//! The identity provider is external. The orchestrator either carries a
//! pre-issued token, or obtains one with the client-credentials grant.

use crate::errors::UpstreamCallError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Refresh a cached token this long before it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Used when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 300;

/// **Supplies the bearer token for ledger calls**
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// `None` means the calls go out without an `Authorization` header.
    async fn bearer_token(&self) -> Result<Option<String>, UpstreamCallError>;
}

/// No credentials; for a ledger running with authorization disabled.
#[derive(Debug, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, UpstreamCallError> {
        Ok(None)
    }
}

/// A pre-issued token.
#[derive(Debug)]
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<Option<String>, UpstreamCallError> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// **The OAuth2 client-credentials grant**
///
/// Posts `grant_type=client_credentials` with the client id and secret to
/// the token endpoint, and caches the access token until shortly before it
/// expires.
pub struct ClientCredentials {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(
        token_url: Url,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, UpstreamCallError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<CachedToken, UpstreamCallError> {
        log::debug!("Requesting a service token from {}", self.token_url);

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|err| UpstreamCallError::Credentials(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamCallError::Credentials(format!(
                "token endpoint responded {status}: {text}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|err| UpstreamCallError::Credentials(err.to_string()))?;

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));
        Ok(CachedToken {
            token: body.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, UpstreamCallError> {
        let mut cached = self.cached.lock().await;

        if let Some(current) = cached.as_ref() {
            if Instant::now() < current.refresh_at {
                return Ok(Some(current.token.clone()));
            }
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(Some(token))
    }
}
