//! Generic strategy for unfamiliar markup.

use super::{ParseStrategy, RawResult, ResultBuilder, element_text, normalize_url, resolve_redirect};
use chrono::{DateTime, Utc};
use quarry_core::SearchResult;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Maximum snippet length, in characters.
pub const MAX_SNIPPET_CHARS: usize = 200;

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="result"]"#).expect("invalid selector"));

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("invalid selector"));

/// Best-effort strategy: any element whose class mentions `result`.
///
/// The first link gives title and URL; the container text minus the title
/// becomes the snippet. Field separation is not guaranteed to be accurate.
pub struct FallbackStrategy;

impl ParseStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn extract(&self, document: &Html, max_results: usize, retrieved_at: DateTime<Utc>) -> Vec<SearchResult> {
        let mut builder = ResultBuilder::new(max_results, retrieved_at);

        for container in document.select(&CONTAINER) {
            if builder.is_full() {
                break;
            }

            let Some(link) = container.select(&LINK).next() else { continue };
            let title = element_text(&link);
            let href = link.value().attr("href").unwrap_or_default().to_string();

            // nested containers repeat their parent's first link
            if !href.is_empty() && builder.contains_url(&normalize_url(&resolve_redirect(&href))) {
                continue;
            }

            let text = element_text(&container);
            let remainder = if title.is_empty() { text } else { text.replacen(&title, "", 1) };
            let snippet: String = remainder.trim().chars().take(MAX_SNIPPET_CHARS).collect();

            builder.push(RawResult { title, href, snippet: snippet.trim_end().to_string(), source: None });
        }

        builder.finish()
    }
}
