use closing_common::auth::{AllowAll, Authorizer, StaticTokenAuthorizer, TokenGrant};
use config::builder::{ConfigBuilder, DefaultState};
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Seed the reference pending transactions on start-up
    pub seed_fixtures: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| format!("Invalid server address {}:{}: {}", self.host, self.port, err))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("auth.enabled", false)?
        .set_default("ledger.seed_fixtures", true)
}

impl Config {
    /// **Loads the configuration**
    ///
    /// Layers, lowest priority first:
    /// - built-in defaults;
    /// - `$CONFIG_FILE`, or `config/ledger-<ENVIRONMENT>` (optional);
    /// - `LEDGER_SERVICE__*` environment variables, e.g. `LEDGER_SERVICE__SERVER__PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = defaults()?;

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/ledger-{}", environment)).required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("LEDGER_SERVICE")
                .prefix_separator("__")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        defaults()?.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.server.socket_addr()?;

        if self.auth.enabled && self.auth.tokens.is_empty() {
            return Err("Authorization is enabled, but no tokens are configured".to_string());
        }

        if self.auth.tokens.iter().any(|grant| grant.token.trim().is_empty()) {
            return Err("Configured tokens cannot be empty".to_string());
        }

        Ok(())
    }

    /// The authorizer the configuration asks for.
    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        if self.auth.enabled {
            Arc::new(StaticTokenAuthorizer::new(self.auth.tokens.clone()))
        } else {
            log::warn!("Authorization is disabled; every request is allowed.");
            Arc::new(AllowAll)
        }
    }
}
