//! Client configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `SKILLSWAP_*` environment variables (`__` separates nested keys, e.g.
//! `SKILLSWAP_RETRY__MAX_ATTEMPTS`).

use crate::client::error::ClientError;
use crate::client::retry::{RefreshMode, RetryPolicy};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Settings for [`ApiClient`](crate::client::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the resource API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base address of the auth endpoints; derived from `api_url` when unset
    #[serde(default)]
    pub auth_url: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Route announced in [`SessionState::Expired`](crate::session::SessionState)
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub refresh_mode: RefreshMode,
}

fn default_api_url() -> String {
    "http://skillswap-app.duckdns.org/api".to_string()
}

fn default_user_agent() -> String {
    concat!("skillswap-api/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_url: None,
            timeout_ms: None,
            user_agent: default_user_agent(),
            login_route: default_login_route(),
            retry: RetryPolicy::default(),
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at the given API base address
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("SKILLSWAP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that addresses parse and the retry budget is usable
    pub fn validate(&self) -> Result<(), ClientError> {
        for (name, value) in [("api_url", self.api_base()), ("auth_url", self.auth_base())] {
            Url::parse(&value)
                .map_err(|e| ClientError::Configuration(format!("{name} '{value}': {e}")))?;
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::Configuration(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ClientError::Configuration(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// API base address without a trailing slash
    pub fn api_base(&self) -> String {
        self.api_url.trim_end_matches('/').to_string()
    }

    /// Auth base address without a trailing slash
    ///
    /// Unless configured explicitly this is the API base with a trailing
    /// `/api` segment replaced by `/auth`.
    pub fn auth_base(&self) -> String {
        if let Some(auth_url) = &self.auth_url {
            return auth_url.trim_end_matches('/').to_string();
        }
        let api = self.api_url.trim_end_matches('/');
        format!("{}/auth", api.strip_suffix("/api").unwrap_or(api))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
