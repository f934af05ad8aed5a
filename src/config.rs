//! Client configuration
//!
//! Settings are read from an optional YAML file and then overridden by
//! `STOREFRONT_*` environment variables.
//!
//! ```yaml
//! base_url: http://localhost:8000
//! timeout_seconds: 30
//! max_retries: 0
//! cursor: rebase
//! rate_limit:
//!   requests_per_second: 5
//!   burst_size: 5
//! headers:
//!   ngrok-skip-browser-warning: "true"
//! ```

use crate::api::StorefrontClient;
use crate::auth::SessionStore;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::CursorPolicy;
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "STOREFRONT_BASE_URL";
/// Environment variable overriding `session_file`
pub const ENV_SESSION_FILE: &str = "STOREFRONT_SESSION_FILE";
/// Environment variable overriding `timeout_seconds`
pub const ENV_TIMEOUT_SECS: &str = "STOREFRONT_TIMEOUT_SECS";

/// How listing cursors are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    /// Request `next_page_url` as sent
    #[default]
    Verbatim,
    /// Re-root `next_page_url` on `base_url`
    Rebase,
}

/// Retry backoff settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Backoff type
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            initial_ms: default_initial_backoff(),
            max_ms: default_max_backoff(),
        }
    }
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

/// Storefront client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries per request (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Cursor handling for listings
    #[serde(default)]
    pub cursor: CursorMode,

    /// Where the login session is kept
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: 0,
            backoff: BackoffConfig::default(),
            rate_limit: None,
            cursor: CursorMode::default(),
            session_file: None,
            headers: HashMap::new(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `STOREFRONT_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).none_if_empty() {
            self.base_url = base_url;
        }
        if let Some(path) = lookup(ENV_SESSION_FILE).none_if_empty() {
            self.session_file = Some(PathBuf::from(path));
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS).none_if_empty() {
            self.timeout_seconds = timeout.trim().parse().map_err(|_| {
                Error::invalid_value(ENV_TIMEOUT_SECS, format!("'{timeout}' is not a number"))
            })?;
        }
        self.validate()
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", format!("'{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value("timeout_seconds", "must be at least 1"));
        }
        Ok(())
    }

    /// HTTP client settings
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff.backoff_type,
                Duration::from_millis(self.backoff.initial_ms),
                Duration::from_millis(self.backoff.max_ms),
            );

        builder = match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Cursor policy for listings
    pub fn cursor_policy(&self) -> CursorPolicy {
        match self.cursor {
            CursorMode::Verbatim => CursorPolicy::Verbatim,
            CursorMode::Rebase => CursorPolicy::rebase(&self.base_url),
        }
    }

    /// Session file path: the configured one, else `~/.storefront/session.json`
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file.clone().or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".storefront").join("session.json"))
        })
    }

    /// Open the session store, in memory when no path is known
    pub fn session_store(&self) -> Result<SessionStore> {
        match self.session_path() {
            Some(path) => SessionStore::from_file(path),
            None => Ok(SessionStore::in_memory()),
        }
    }

    /// Build a storefront client with the configured session store
    pub fn client(&self) -> Result<StorefrontClient> {
        let client = StorefrontClient::new(self.http_config(), self.session_store()?)?;
        Ok(client.with_cursor_policy(self.cursor_policy()))
    }
}
