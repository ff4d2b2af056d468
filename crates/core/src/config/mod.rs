//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (QUARRY_*)
//! 2. TOML config file (if QUARRY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, MAX_RETRIES, TIMEOUT_MS_RANGE};

/// Default results endpoint (DuckDuckGo's HTML-only interface).
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (QUARRY_*)
/// 2. TOML config file (if QUARRY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via QUARRY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt HTTP timeout in milliseconds.
    ///
    /// Set via QUARRY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Additional attempts after a retryable failure.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Minimum interval between requests to the same host, in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Whether to consult robots.txt before fetching.
    ///
    /// Set via QUARRY_RESPECT_ROBOTS environment variable.
    #[serde(default)]
    pub respect_robots: bool,

    /// Default number of results per search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Whether searches read and write the result cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Result cache time-to-live in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Maximum number of cached queries.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Results page endpoint.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Listen address for the HTTP server.
    ///
    /// Set via QUARRY_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_user_agent() -> String {
    format!("quarry/{} (+https://github.com/quarry-search/quarry)", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_rate_limit_ms() -> u64 {
    1_000
}

fn default_max_results() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_cache_size() -> usize {
    100
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.into()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            rate_limit_ms: default_rate_limit_ms(),
            respect_robots: false,
            max_results: default_max_results(),
            use_cache: true,
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_size: default_cache_size(),
            search_url: default_search_url(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `QUARRY_`
    /// 2. TOML file from `QUARRY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("QUARRY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("QUARRY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
