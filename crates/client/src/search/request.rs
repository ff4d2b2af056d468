//! Search options and results page URL construction.

use quarry_core::{AppConfig, Error};
use std::time::Duration;
use url::Url;

use crate::fetch::FetchOptions;

/// Options for a single search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results (default 10).
    pub max: usize,

    /// Cache TTL, used when the cache is first created (default 5 minutes).
    pub cache_ttl: Duration,

    /// Cache capacity, used when the cache is first created (default 100).
    pub cache_size: usize,

    /// User agent for the results page and robots.txt requests.
    pub user_agent: String,

    /// Minimum interval between requests to the search host (default 1s).
    pub rate_limit: Duration,

    /// Reserved for instant-answer support; only affects the cache key.
    pub use_instant_api: bool,

    /// Read and write the result cache (default true).
    pub use_cache: bool,

    /// Per-attempt timeout (default 10s).
    pub timeout: Duration,

    /// Additional attempts after a retryable failure (default 3).
    pub retries: u32,

    /// Base delay for exponential backoff (default 1s).
    pub retry_delay: Duration,

    /// Consult robots.txt before fetching (default false).
    pub check_robots: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SearchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max: config.max_results,
            cache_ttl: config.cache_ttl(),
            cache_size: config.cache_size,
            user_agent: config.user_agent.clone(),
            rate_limit: config.rate_limit(),
            use_instant_api: false,
            use_cache: config.use_cache,
            timeout: config.timeout(),
            retries: config.retries,
            retry_delay: config.retry_delay(),
            check_robots: config.respect_robots,
        }
    }
}

impl SearchOptions {
    /// Fetch options derived from these search options.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            check_robots: self.check_robots,
        }
    }
}

/// Validate a query, returning it trimmed.
///
/// Returns an error if the query is empty or whitespace-only.
pub fn validate_query(query: &str) -> Result<&str, Error> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("query must be a non-empty string".to_string()));
    }
    Ok(trimmed)
}

/// Results page URL for `query`, with the query form-encoded as `q`.
pub fn search_url(base: &str, query: &str) -> Result<Url, Error> {
    let mut url = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}
