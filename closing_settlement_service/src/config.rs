use crate::client::parse_base_url;
use crate::credentials::{ClientCredentials, CredentialProvider, NoCredentials, StaticToken};
use config::builder::{ConfigBuilder, DefaultState};
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SettlementConfig {
    /// `0` disables the periodic trigger
    pub interval_secs: u64,
}

/// Either a static `token`, or `token_url` + `client_id` + `client_secret`
/// for the client-credentials grant. Neither means no credentials.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub token: Option<String>,
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| format!("Invalid server address {}:{}: {}", self.host, self.port, err))
    }
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SettlementConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8081)?
        .set_default("ledger.base_url", "http://127.0.0.1:8080/")?
        .set_default("ledger.timeout_secs", 30)?
        .set_default("settlement.interval_secs", 0)
}

impl Config {
    /// **Loads the configuration**
    ///
    /// Layers, lowest priority first:
    /// - built-in defaults;
    /// - `$CONFIG_FILE`, or `config/settlement-<ENVIRONMENT>` (optional);
    /// - `SETTLEMENT_SERVICE__*` environment variables, e.g. `SETTLEMENT_SERVICE__LEDGER__BASE_URL`;
    /// - `LEDGER_URL`, as a shortcut for the ledger's base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = defaults()?;

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/settlement-{}", environment)).required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SETTLEMENT_SERVICE")
                .prefix_separator("__")
                .separator("__"),
        );

        if let Ok(ledger_url) = env::var("LEDGER_URL") {
            builder = builder.set_override("ledger.base_url", ledger_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        defaults()?.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.server.socket_addr()?;
        parse_base_url(&self.ledger.base_url).map_err(|err| err.to_string())?;

        if self.ledger.timeout_secs == 0 {
            return Err("Ledger timeout must be at least one second".to_string());
        }

        let creds = &self.credentials;
        let grant_fields = [&creds.token_url, &creds.client_id, &creds.client_secret];
        let given = grant_fields.iter().filter(|field| field.is_some()).count();

        if given != 0 && given != grant_fields.len() {
            return Err(
                "Client credentials need all of token_url, client_id and client_secret".to_string(),
            );
        }

        if given != 0 && creds.token.is_some() {
            return Err("Configure either a static token or client credentials, not both".to_string());
        }

        Ok(())
    }

    /// The credential provider the configuration asks for.
    pub fn credential_provider(&self) -> Result<Arc<dyn CredentialProvider>, String> {
        let creds = &self.credentials;

        match (&creds.token, &creds.token_url, &creds.client_id, &creds.client_secret) {
            (None, Some(token_url), Some(client_id), Some(client_secret)) => {
                let token_url = reqwest::Url::parse(token_url).map_err(|err| err.to_string())?;
                log::info!("Using client credentials from {}", token_url);
                let provider = ClientCredentials::new(
                    token_url,
                    client_id.clone(),
                    client_secret.clone(),
                    self.ledger.timeout(),
                )
                .map_err(|err| err.to_string())?;
                Ok(Arc::new(provider))
            }
            (Some(token), None, None, None) => {
                log::info!("Using a static service token.");
                Ok(Arc::new(StaticToken(token.clone())))
            }
            (None, None, None, None) => {
                log::warn!("No service credentials configured; calling the ledger anonymously.");
                Ok(Arc::new(NoCredentials))
            }
            _ => Err("Inconsistent credentials configuration".to_string()),
        }
    }
}
