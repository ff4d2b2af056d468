//! HTTP fetch pipeline with per-host throttling, robots.txt gating and retries.
//!
//! ### Rate Limiting
//! - One tracker per host; a request waits until the host's minimum
//!   interval has passed since the previous one.
//! - The wait happens once per `fetch` call, not per retry.
//!
//! ### robots.txt
//! - Only consulted when `FetchOptions::check_robots` is set.
//! - Retrieval failures mean "allowed"; a disallowed path fails immediately.
//!
//! ### Retries
//! - Non-2xx responses and transport errors are retried up to `retries`
//!   times, waiting `retry_delay * 2^n` before retry `n` (0-based).
//! - Timeouts and robots refusals are never retried.

pub mod rate_limit;
pub mod robots;
pub mod url;

use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use rate_limit::HostRateLimiter;
pub use robots::{RobotsRules, fetch_robots_txt};
pub use self::url::{UrlError, domain_of, normalize_url};

use quarry_core::Error;

/// Default Accept header, matching a desktop browser.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Default Accept-Language header.
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Per-call fetch options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// User agent string sent with every request.
    pub user_agent: String,

    /// Per-attempt timeout (default: 10s)
    pub timeout: Duration,

    /// Additional attempts after a retryable failure (default: 3)
    pub retries: u32,

    /// Base delay for exponential backoff (default: 1s)
    pub retry_delay: Duration,

    /// Whether to consult robots.txt first (default: false)
    pub check_robots: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: quarry_core::AppConfig::default().user_agent,
            timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_secs(1),
            check_robots: false,
        }
    }
}

impl FetchOptions {
    /// Delay before retry `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl From<&quarry_core::AppConfig> for FetchOptions {
    fn from(config: &quarry_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            retries: config.retries,
            retry_delay: config.retry_delay(),
            check_robots: config.respect_robots,
        }
    }
}

/// Rate-limited HTTP fetch client.
pub struct FetchClient {
    http: Client,
    rate_limiter: HostRateLimiter,
}

impl FetchClient {
    /// Create a new fetch client whose hosts default to `min_interval` between requests.
    pub fn new(min_interval: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, rate_limiter: HostRateLimiter::new(min_interval) })
    }

    /// Fetch a URL and return its body as text.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if `url_str` is not an absolute URL with a host
    /// - `RobotsDisallowed` if robots.txt blocks the path
    /// - `FetchTimeout` if an attempt times out
    /// - `RetriesExhausted` once every attempt failed with a retryable error
    pub async fn fetch(&self, url_str: &str, options: &FetchOptions) -> Result<String, Error> {
        let url = url::parse(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("no host in {}", url_str)))?
            .to_string();

        self.rate_limiter.acquire(&host).await;

        if options.check_robots {
            self.check_robots(&url, &options.user_agent).await?;
        }

        let attempts = options.retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            let err = match self.attempt(&url, options).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= options.retries {
                tracing::warn!("giving up on {} after {} attempts: {}", url, attempts, err);
                return Err(Error::RetriesExhausted { url: url.to_string(), attempts, source: Box::new(err) });
            }

            let delay = options.backoff(attempt);
            tracing::debug!("retrying {} in {:?} (retry {} of {}): {}", url, delay, attempt + 1, options.retries, err);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn check_robots(&self, url: &reqwest::Url, user_agent: &str) -> Result<(), Error> {
        let Some(text) = fetch_robots_txt(&self.http, url, user_agent).await else {
            return Ok(());
        };

        let rules = RobotsRules::parse(&text, user_agent);
        if rules.is_allowed(url.path()) {
            return Ok(());
        }

        tracing::info!("robots.txt disallows {}", url);
        Err(Error::RobotsDisallowed(format!("{} is disallowed by robots.txt", url)))
    }

    /// One GET with the per-attempt timeout.
    async fn attempt(&self, url: &reqwest::Url, options: &FetchOptions) -> Result<String, Error> {
        let start = Instant::now();
        let response = self
            .http
            .get(url.as_str())
            .header(header::USER_AGENT, &options.user_agent)
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify(e, options.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| classify(e, options.timeout))?;

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), body.len());

        Ok(body)
    }

    /// Override the minimum interval for one host.
    pub async fn set_host_interval(&self, host: &str, interval: Duration) {
        self.rate_limiter.set_interval(host, interval).await;
    }

    /// Get reference to the rate limiter.
    pub fn rate_limiter(&self) -> &HostRateLimiter {
        &self.rate_limiter
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("no response within {}ms", timeout.as_millis()))
    } else {
        Error::Network(err.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_options() -> FetchOptions {
        FetchOptions {
            user_agent: "quarry-test/0.1".into(),
            timeout: Duration::from_secs(5),
            retries: 2,
            retry_delay: Duration::from_millis(10),
            check_robots: false,
        }
    }

    fn client() -> FetchClient {
        FetchClient::new(Duration::ZERO).unwrap()
    }

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.retries, 3);
        assert_eq!(options.retry_delay, Duration::from_secs(1));
        assert!(!options.check_robots);
        assert!(options.user_agent.starts_with("quarry/"));
    }

    #[test]
    fn test_backoff_doubles_per_retry() {
        let options = FetchOptions { retry_delay: Duration::from_millis(100), ..Default::default() };
        assert_eq!(options.backoff(0), Duration::from_millis(100));
        assert_eq!(options.backoff(1), Duration::from_millis(200));
        assert_eq!(options.backoff(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_retries_after_server_error() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/page",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                    } else {
                        (StatusCode::OK, "<html>ok</html>")
                    }
                }
            }),
        );
        let addr = test_server::spawn(app).await;

        let body = client().fetch(&format!("http://{addr}/page"), &fast_options()).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_attempts() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/down",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "down")
                }
            }),
        );
        let addr = test_server::spawn(app).await;

        let err = client().fetch(&format!("http://{addr}/down"), &fast_options()).await.unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        match err {
            Error::RetriesExhausted { url, attempts, source } => {
                assert!(url.ends_with("/down"));
                assert_eq!(attempts, 3);
                assert!(matches!(*source, Error::HttpError { status: 503, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/slow",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }
            }),
        );
        let addr = test_server::spawn(app).await;
        let options = FetchOptions { timeout: Duration::from_millis(200), retries: 3, ..fast_options() };

        let err = client().fetch(&format!("http://{addr}/slow"), &options).await.unwrap_err();

        assert!(matches!(err, Error::FetchTimeout(_)), "got {err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let app = Router::new().route(
            "/headers",
            get(|headers: axum::http::HeaderMap| async move {
                let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("").to_string();
                format!("{}|{}|{}", get("user-agent"), get("accept"), get("accept-language"))
            }),
        );
        let addr = test_server::spawn(app).await;

        let body = client().fetch(&format!("http://{addr}/headers"), &fast_options()).await.unwrap();

        assert_eq!(body, format!("quarry-test/0.1|{ACCEPT_HTML}|{ACCEPT_LANGUAGE}"));
    }

    #[tokio::test]
    async fn test_robots_disallow_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new()
            .route("/robots.txt", get(|| async { "User-agent: *\nDisallow: /private\n" }))
            .route(
                "/private/page",
                get(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "secret"
                    }
                }),
            );
        let addr = test_server::spawn(app).await;
        let options = FetchOptions { check_robots: true, ..fast_options() };

        let err = client().fetch(&format!("http://{addr}/private/page"), &options).await.unwrap_err();

        assert!(matches!(err, Error::RobotsDisallowed(_)), "got {err}");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_robots_fails_open() {
        let app = Router::new().route("/page", get(|| async { "open" }));
        let addr = test_server::spawn(app).await;
        let options = FetchOptions { check_robots: true, ..fast_options() };

        let body = client().fetch(&format!("http://{addr}/page"), &options).await.unwrap();
        assert_eq!(body, "open");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = client().fetch("not a url", &fast_options()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_applies_once_per_fetch() {
        let app = Router::new().route("/", get(|| async { "ok" }));
        let addr = test_server::spawn(app).await;
        let client = FetchClient::new(Duration::from_millis(300)).unwrap();
        let url = format!("http://{addr}/");

        client.fetch(&url, &fast_options()).await.unwrap();
        let start = std::time::Instant::now();
        client.fetch(&url, &fast_options()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(client.rate_limiter().tracked_hosts().await, 1);
    }
}
