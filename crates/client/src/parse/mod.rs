//! Results page parsing.
//!
//! ### Strategies
//! - [`PrimaryStrategy`] knows DuckDuckGo's HTML markup: result containers,
//!   title links, snippets and the displayed URL.
//! - [`FallbackStrategy`] runs only when the primary strategy finds nothing.
//!   It takes the first link of any element whose class mentions `result`.
//!
//! Parsing never fails: malformed or empty input yields an empty list.

mod fallback;
mod primary;

pub use fallback::FallbackStrategy;
pub use primary::PrimaryStrategy;

use crate::fetch::{domain_of, normalize_url};
use chrono::{DateTime, Utc};
use quarry_core::SearchResult;
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html};

/// Title used when a result link has no text.
pub const UNTITLED: &str = "Untitled";

/// Path prefixes of DuckDuckGo's click-through redirect links.
const REDIRECT_PREFIXES: &[&str] = &["//duckduckgo.com/l/?", "/l/?"];

/// Stable extraction trait for result parsing strategies.
pub trait ParseStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Extract up to `max_results` results from a parsed document.
    fn extract(&self, document: &Html, max_results: usize, retrieved_at: DateTime<Utc>) -> Vec<SearchResult>;
}

/// Options for [`parse_results`].
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub max_results: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

/// Parse a results page into ranked results.
///
/// Tries the primary strategy, then the fallback strategy if the first
/// produced nothing.
pub fn parse_results(html: &str, options: ParseOptions) -> Vec<SearchResult> {
    if html.trim().is_empty() || options.max_results == 0 {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let retrieved_at = Utc::now();

    let strategies: [&dyn ParseStrategy; 2] = [&PrimaryStrategy, &FallbackStrategy];
    for strategy in strategies {
        let results = strategy.extract(&document, options.max_results, retrieved_at);
        if !results.is_empty() {
            tracing::debug!("{} strategy parsed {} results", strategy.name(), results.len());
            return results;
        }
        tracing::debug!("{} strategy found no results", strategy.name());
    }

    Vec::new()
}

/// Collects results with sequential ranks until the limit is reached.
pub(crate) struct ResultBuilder {
    results: Vec<SearchResult>,
    max_results: usize,
    retrieved_at: DateTime<Utc>,
}

/// Raw fields of one result before normalization.
pub(crate) struct RawResult {
    pub title: String,
    pub href: String,
    pub snippet: String,
    pub source: Option<String>,
}

impl ResultBuilder {
    pub fn new(max_results: usize, retrieved_at: DateTime<Utc>) -> Self {
        Self { results: Vec::with_capacity(max_results.min(50)), max_results, retrieved_at }
    }

    pub fn is_full(&self) -> bool {
        self.results.len() >= self.max_results
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.results.iter().any(|r| r.url == url)
    }

    /// Add a result unless both title and URL are empty.
    ///
    /// Returns whether the result was kept.
    pub fn push(&mut self, raw: RawResult) -> bool {
        let title = raw.title.trim().to_string();
        let href = raw.href.trim();
        if title.is_empty() && href.is_empty() {
            return false;
        }

        let url = if href.is_empty() { String::new() } else { normalize_url(&resolve_redirect(href)) };
        let source = raw
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| domain_of(&url))
            .unwrap_or_default();

        self.results.push(SearchResult {
            title: if title.is_empty() { UNTITLED.to_string() } else { title },
            url,
            snippet: raw.snippet,
            rank: self.results.len() + 1,
            source,
            retrieved_at: self.retrieved_at,
            cached: None,
        });
        true
    }

    pub fn finish(self) -> Vec<SearchResult> {
        self.results
    }
}

/// Unwrap a DuckDuckGo redirect link to its `uddg` target.
///
/// Anything that is not a redirect link, or a redirect whose `uddg` value
/// is missing, empty or does not decode cleanly, is returned as-is.
pub fn resolve_redirect(href: &str) -> String {
    let Some(query) = REDIRECT_PREFIXES.iter().find_map(|prefix| href.strip_prefix(prefix)) else {
        return href.to_string();
    };

    match query.split('&').find_map(|pair| pair.strip_prefix("uddg=")).and_then(decode_component) {
        Some(target) if !target.is_empty() => target,
        _ => {
            tracing::trace!("keeping undecodable redirect link: {}", href);
            href.to_string()
        }
    }
}

/// Strict form-component decoding: `None` on a malformed `%` escape or
/// on bytes that are not UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if malformed {
        return None;
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8().ok().map(|s| s.into_owned())
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
