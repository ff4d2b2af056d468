//! DuckDuckGo HTML markup strategy.

use super::{ParseStrategy, RawResult, ResultBuilder, element_text};
use chrono::{DateTime, Utc};
use quarry_core::SearchResult;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result, .web-result").expect("invalid selector"));

static TITLE_LINKS: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["a.result__a", "a.result-link"]));

static SNIPPETS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".result__snippet", ".result-snippet", "td.result-snippet"]));

static DISPLAY_URL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".result__url").expect("invalid selector"));

fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns.iter().map(|p| Selector::parse(p).expect("invalid selector")).collect()
}

/// First element under `scope` matching any selector, in priority order.
fn first_match<'a>(scope: &ElementRef<'a>, candidates: &[Selector]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|s| scope.select(s).next())
}

/// Strategy for DuckDuckGo's `html/` results markup.
pub struct PrimaryStrategy;

impl ParseStrategy for PrimaryStrategy {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn extract(&self, document: &Html, max_results: usize, retrieved_at: DateTime<Utc>) -> Vec<SearchResult> {
        let mut builder = ResultBuilder::new(max_results, retrieved_at);

        for container in document.select(&CONTAINER) {
            if builder.is_full() {
                break;
            }

            let link = first_match(&container, &TITLE_LINKS);
            let title = link.as_ref().map(element_text).unwrap_or_default();
            let href = link.and_then(|a| a.value().attr("href")).unwrap_or_default().to_string();

            let snippet = first_match(&container, &SNIPPETS).map(|e| element_text(&e)).unwrap_or_default();
            let source = container.select(&DISPLAY_URL).next().map(|e| element_text(&e));

            builder.push(RawResult { title, href, snippet, source });
        }

        builder.finish()
    }
}
