//! Search orchestration: cache lookup, rate-limited fetch, parse, cache write.
//!
//! ### Lifecycle
//! - Create one [`Searcher`] per process (or per tenant), share it behind
//!   an `Arc`, and call [`Searcher::search`] concurrently.
//! - The result cache is created on the first cached search, sized by that
//!   call's `cache_size` and `cache_ttl`.
//! - [`Searcher::reset`] drops the cache and every rate-limit tracker.
//!
//! ### Cache Key
//! - Fingerprint of the trimmed query, `max` and `use_instant_api` only.
//!   Calls differing in user agent, rate limit or robots settings share
//!   an entry.
//! - Concurrent identical searches are not deduplicated.

pub mod request;

pub use request::{SearchOptions, search_url, validate_query};

use crate::fetch::FetchClient;
use crate::parse::{ParseOptions, parse_results};
use quarry_core::{AppConfig, CacheStats, Error, ResultCache, SearchResult, fingerprint};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Construction-time settings for a [`Searcher`].
#[derive(Debug, Clone)]
pub struct SearcherConfig {
    /// Results page endpoint (default: DuckDuckGo's HTML interface).
    pub search_url: String,
    /// Minimum interval for hosts without an explicit override.
    pub default_rate_limit: Duration,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SearcherConfig {
    fn from(config: &AppConfig) -> Self {
        Self { search_url: config.search_url.clone(), default_rate_limit: config.rate_limit() }
    }
}

/// Caller-owned search context holding the fetcher and the result cache.
pub struct Searcher {
    fetcher: FetchClient,
    search_url: Url,
    cache: RwLock<Option<Arc<ResultCache>>>,
}

impl Searcher {
    /// Create a new searcher with the given configuration.
    pub fn new(config: SearcherConfig) -> Result<Self, Error> {
        let search_url = Url::parse(&config.search_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.search_url, e)))?;
        if search_url.host_str().is_none() {
            return Err(Error::InvalidUrl(format!("no host in {}", config.search_url)));
        }

        Ok(Self { fetcher: FetchClient::new(config.default_rate_limit)?, search_url, cache: RwLock::new(None) })
    }

    /// Run a search, serving from cache when possible.
    ///
    /// Cache hits come back with `cached: Some(true)` on every result.
    /// Empty result lists are never cached.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or whitespace-only query, before any I/O
    /// - `SearchFailed` wrapping any fetch failure, with the query attached
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>, Error> {
        let query = validate_query(query)?;
        let key = fingerprint(query, options.max, options.use_instant_api);

        let cache = if options.use_cache { Some(self.cache_for(options).await) } else { None };

        if let Some(cache) = &cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!("cache hit for search query: {}", query);
                return Ok(hit.iter().map(SearchResult::as_cached).collect());
            }
            tracing::debug!("cache miss for search query: {}", query);
        }

        let html = self.search_html(query, options).await.map_err(|e| e.with_query(query))?;
        let results = parse_results(&html, ParseOptions { max_results: options.max });

        tracing::debug!("search {:?} returned {} results", query, results.len());

        if let Some(cache) = cache
            && !results.is_empty()
        {
            cache.set(&key, results.clone()).await;
        }

        Ok(results)
    }

    /// Fetch the raw results page for `query`.
    ///
    /// Applies `options.rate_limit` to the search host before fetching.
    pub async fn search_html(&self, query: &str, options: &SearchOptions) -> Result<String, Error> {
        let url = search_url(self.search_url.as_str(), query)?;
        if let Some(host) = url.host_str() {
            self.fetcher.set_host_interval(host, options.rate_limit).await;
        }

        self.fetcher.fetch(url.as_str(), &options.fetch_options()).await
    }

    async fn cache_for(&self, options: &SearchOptions) -> Arc<ResultCache> {
        if let Some(cache) = self.cache.read().await.as_ref() {
            return cache.clone();
        }

        let mut slot = self.cache.write().await;
        slot.get_or_insert_with(|| {
            tracing::debug!("creating result cache (size {}, ttl {:?})", options.cache_size, options.cache_ttl);
            Arc::new(ResultCache::new(options.cache_size, options.cache_ttl))
        })
        .clone()
    }

    /// Empty the result cache, if one exists.
    pub async fn clear_cache(&self) {
        if let Some(cache) = self.cache.read().await.as_ref() {
            cache.clear().await;
        }
    }

    /// Cache statistics, or `None` if no cached search has run yet.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        let cache = self.cache.read().await.clone()?;
        Some(cache.stats().await)
    }

    /// Drop the cache and forget every rate-limit tracker.
    pub async fn reset(&self) {
        self.cache.write().await.take();
        self.fetcher.rate_limiter().reset().await;
    }

    /// Get reference to the fetch client.
    pub fn fetcher(&self) -> &FetchClient {
        &self.fetcher
    }
}
