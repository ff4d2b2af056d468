//! Range and format checks run on every loaded [`AppConfig`].

use crate::config::AppConfig;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted `timeout_ms` range.
pub const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=300_000;

/// Upper bound for `retries`.
pub const MAX_RETRIES: u32 = 10;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `user_agent` is empty
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `retries` exceeds 10
    /// - `cache_size` is 0
    /// - `max_results` is outside 1..=50
    /// - `search_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.timeout_ms < *TIMEOUT_MS_RANGE.start() {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > *TIMEOUT_MS_RANGE.end() {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.retries > MAX_RETRIES {
            return Err(ConfigError::Invalid { field: "retries".into(), reason: "must not exceed 10".into() });
        }

        if self.cache_size == 0 {
            return Err(ConfigError::Invalid { field: "cache_size".into(), reason: "must be greater than 0".into() });
        }

        if !(1..=50).contains(&self.max_results) {
            return Err(ConfigError::Invalid { field: "max_results".into(), reason: "must be between 1 and 50".into() });
        }

        match url::Url::parse(&self.search_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {}
            _ => {
                return Err(ConfigError::Invalid {
                    field: "search_url".into(),
                    reason: format!("not an http(s) URL: {}", self.search_url),
                });
            }
        }

        if !self.use_cache && self.cache_ttl_ms > 0 {
            tracing::debug!(cache_ttl_ms = self.cache_ttl_ms, "cache disabled; cache_ttl_ms has no effect");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_too_many_retries() {
        let config = AppConfig { retries: 11, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retries"));
    }

    #[test]
    fn test_validate_zero_cache_size() {
        let config = AppConfig { cache_size: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_size"));
    }

    #[test]
    fn test_validate_max_results_range() {
        let config = AppConfig { max_results: 51, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_results"));

        let config = AppConfig { max_results: 50, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_search_url() {
        let config = AppConfig { search_url: "ftp://example.com/".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "search_url"));

        let config = AppConfig { search_url: "http://127.0.0.1:8080/html/".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
