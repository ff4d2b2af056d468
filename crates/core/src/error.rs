//! Unified error types for quarry.
//!
//! Every variant renders with a stable upper-case code prefix so callers
//! (the HTTP server, the CLI) can surface it without re-mapping.

/// Unified error types for the search pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or has no host.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Robots.txt disallowed access.
    #[error("ROBOTS_DISALLOWED: {0}")]
    RobotsDisallowed(String),

    /// A single attempt ran past its timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Non-2xx HTTP response.
    #[error("HTTP_ERROR: {status} {reason}")]
    HttpError { status: u16, reason: String },

    /// Transport-level failure (connect, reset, body read).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// All attempts failed with retryable errors.
    #[error("FETCH_FAILED: {url} after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// Fetch or parse failure with the originating query attached.
    #[error("SEARCH_FAILED: query \"{query}\": {source}")]
    SearchFailed {
        query: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the fetcher should retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::HttpError { .. } | Error::Network(_))
    }

    /// Whether the error stems from caller input rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::InvalidInput(_) => true,
            Error::SearchFailed { source, .. } => source.is_client_error(),
            _ => false,
        }
    }

    /// Wrap with the query that produced this error.
    pub fn with_query(self, query: impl Into<String>) -> Self {
        Error::SearchFailed { query: query.into(), source: Box::new(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("query cannot be empty".to_string());
        assert!(err.to_string().contains("INVALID_INPUT"));
        assert!(err.to_string().contains("query cannot be empty"));

        let err = Error::HttpError { status: 503, reason: "Service Unavailable".into() };
        assert_eq!(err.to_string(), "HTTP_ERROR: 503 Service Unavailable");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::HttpError { status: 500, reason: String::new() }.is_retryable());
        assert!(Error::Network("connection reset".into()).is_retryable());
        assert!(!Error::FetchTimeout("10s".into()).is_retryable());
        assert!(!Error::RobotsDisallowed("/private".into()).is_retryable());
        assert!(!Error::InvalidInput("".into()).is_retryable());
    }

    #[test]
    fn test_retries_exhausted_names_url_and_cause() {
        let err = Error::RetriesExhausted {
            url: "https://example.com/".into(),
            attempts: 4,
            source: Box::new(Error::HttpError { status: 502, reason: "Bad Gateway".into() }),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/"));
        assert!(msg.contains("4 attempts"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_with_query_wraps() {
        let err = Error::FetchTimeout("10s".into()).with_query("rust async");
        assert!(matches!(err, Error::SearchFailed { ref query, .. } if query == "rust async"));
        assert!(err.to_string().contains("FETCH_TIMEOUT"));
        assert!(!err.is_client_error());
    }
}
