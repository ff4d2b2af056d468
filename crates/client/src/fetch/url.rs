//! URL normalization for result links.

use url::{Url, form_urlencoded};

/// Error type for URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Query parameters stripped during normalization.
///
/// Entries ending in `_` match any parameter with that prefix.
pub const TRACKING_PARAMS: &[&str] = &[
    "utm_", "ref", "fbclid", "gclid", "msclkid", "twclid", "igshid", "_ga", "_gid", "mc_cid", "mc_eid",
];

/// Whether `name` is a tracking parameter.
pub fn is_tracking_param(name: &str) -> bool {
    TRACKING_PARAMS.iter().any(|p| if p.ends_with('_') { name.starts_with(p) } else { name == *p })
}

/// Whether a raw `key=value` query segment carries a tracking parameter.
fn is_tracking_segment(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes()).next().is_some_and(|(key, _)| is_tracking_param(&key))
}

/// Parse an absolute URL.
pub fn parse(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Strip tracking parameters and a trailing slash from a parsed URL.
///
/// Remaining parameters keep their order and their original encoding. The
/// trailing slash is kept when the path is exactly `/`.
pub fn normalize(mut url: Url) -> Url {
    let stripped = url.query().and_then(|query| {
        let segments: Vec<&str> = query.split('&').collect();
        let kept: Vec<&str> = segments.iter().copied().filter(|seg| !is_tracking_segment(seg)).collect();
        (kept.len() != segments.len()).then(|| kept.join("&"))
    });

    if let Some(query) = stripped {
        url.set_query(if query.is_empty() { None } else { Some(&query) });
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    url
}

/// Normalize a URL string, returning the input unchanged if it does not parse.
pub fn normalize_url(input: &str) -> String {
    match parse(input) {
        Ok(url) => normalize(url).to_string(),
        Err(e) => {
            tracing::trace!("leaving URL unnormalized ({}): {}", e, input);
            input.to_string()
        }
    }
}

/// Hostname of `input` with a leading `www.` removed.
pub fn domain_of(input: &str) -> Option<String> {
    let url = parse(input).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
