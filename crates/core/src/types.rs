//! Search result record shared by the parser, the cache and the outer surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single organic result scraped from a results page.
///
/// `rank` is 1-based and sequential within one parse pass. `cached` is only
/// set when the record is served from the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub rank: usize,
    pub source: String,
    pub retrieved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl SearchResult {
    /// Copy of this result stamped as served from cache.
    pub fn as_cached(&self) -> Self {
        Self { cached: Some(true), ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchResult {
        SearchResult {
            title: "Example Domain".into(),
            url: "https://example.com".into(),
            snippet: "For use in examples".into(),
            rank: 1,
            source: "example.com".into(),
            retrieved_at: Utc::now(),
            cached: None,
        }
    }

    #[test]
    fn test_serialize_camel_case_without_cached() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("retrievedAt").is_some());
        assert!(json.get("cached").is_none());
        assert_eq!(json["rank"], 1);
    }

    #[test]
    fn test_as_cached() {
        let original = sample();
        let cached = original.as_cached();
        assert_eq!(cached.cached, Some(true));
        assert_eq!(cached.url, original.url);
        assert_eq!(original.cached, None);

        let json = serde_json::to_value(&cached).unwrap();
        assert_eq!(json["cached"], true);
    }

    #[test]
    fn test_retrieved_at_is_rfc3339() {
        let json = serde_json::to_value(sample()).unwrap();
        let stamp = json["retrievedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
