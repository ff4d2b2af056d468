//! Cache key generation for search queries.

use sha2::{Digest, Sha256};

/// Compute the cache fingerprint for a search.
///
/// Only the query, the effective result count and the instant-answer flag
/// take part; rate limit, user agent and robots settings share an entry.
pub fn fingerprint(query: &str, max_results: usize, use_instant_api: bool) -> String {
    let params = serde_json::json!({
        "q": query,
        "max": max_results,
        "instant": use_instant_api,
    });

    let mut hasher = Sha256::new();
    hasher.update(params.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_stability() {
        let a = fingerprint("rust async", 10, false);
        let b = fingerprint("rust async", 10, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_different_params() {
        let base = fingerprint("rust async", 10, false);
        assert_ne!(base, fingerprint("rust async", 5, false));
        assert_ne!(base, fingerprint("rust async", 10, true));
        assert_ne!(base, fingerprint("rust sync", 10, false));
    }

    #[test]
    fn test_fingerprint_format() {
        let hash = fingerprint("rust", 10, false);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
