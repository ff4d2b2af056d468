//! quarry command-line entry point.
//!
//! Runs one search and prints the results to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use quarry_client::{SearchOptions, SearchResult, Searcher, SearcherConfig};
use quarry_core::config::{AppConfig, MAX_RETRIES, TIMEOUT_MS_RANGE};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Search DuckDuckGo's HTML results from the terminal.
#[derive(Debug, Parser)]
#[command(name = "quarry", version, about)]
struct Cli {
    /// Search query; multiple words are joined with spaces.
    #[arg(required = true)]
    query: Vec<String>,

    /// Maximum number of results.
    #[arg(short, long)]
    max: Option<usize>,

    /// Bypass the result cache.
    #[arg(long)]
    no_cache: bool,

    /// Minimum milliseconds between requests to the search host.
    #[arg(long, value_name = "MS")]
    rate_limit: Option<u64>,

    /// Honor robots.txt on the search host.
    #[arg(long)]
    robots: bool,

    /// Per-attempt timeout in milliseconds (100 to 300000).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(TIMEOUT_MS_RANGE))]
    timeout_ms: Option<u64>,

    /// Retries after a failed attempt (at most 10).
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_RETRIES)))]
    retries: Option<u32>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn search_options(&self, config: &AppConfig) -> SearchOptions {
        let defaults = SearchOptions::from(config);
        SearchOptions {
            max: self.max.unwrap_or(defaults.max),
            use_cache: defaults.use_cache && !self.no_cache,
            rate_limit: self.rate_limit.map(Duration::from_millis).unwrap_or(defaults.rate_limit),
            check_robots: defaults.check_robots || self.robots,
            timeout: self.timeout_ms.map(Duration::from_millis).unwrap_or(defaults.timeout),
            retries: self.retries.unwrap_or(defaults.retries),
            ..defaults
        }
    }

    fn query(&self) -> String {
        self.query.join(" ")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;

    let query = cli.query();
    let options = cli.search_options(&config);
    tracing::debug!(query = %query, max = options.max, cache = options.use_cache, "searching");

    let searcher = Searcher::new(SearcherConfig::from(&config))?;
    let results = searcher.search(&query, &options).await?;
    tracing::debug!("{} results for {:?}", results.len(), query);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render(&results));
    }

    Ok(())
}

/// Numbered plain-text listing.
fn render(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }

    let mut out = String::new();
    for r in results {
        out.push_str(&format!("{}. {}\n   {}\n   [{}]\n", r.rank, r.title, r.url, r.source));
        if !r.snippet.is_empty() {
            out.push_str(&format!("   {}\n", r.snippet));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from(["quarry", "rust", "async", "--max", "5", "--no-cache", "--rate-limit", "250"]);
        let opts = cli.search_options(&AppConfig::default());

        assert_eq!(cli.query(), "rust async");
        assert_eq!(opts.max, 5);
        assert!(!opts.use_cache);
        assert_eq!(opts.rate_limit, Duration::from_millis(250));
        assert!(!opts.check_robots);
    }

    #[test]
    fn test_defaults_come_from_config() {
        let cli = Cli::parse_from(["quarry", "tokio"]);
        let config = AppConfig { max_results: 7, retries: 1, ..Default::default() };
        let opts = cli.search_options(&config);

        assert_eq!(opts.max, 7);
        assert_eq!(opts.retries, 1);
        assert!(opts.use_cache);
    }

    #[test]
    fn test_out_of_range_retries_and_timeout_rejected() {
        assert!(Cli::try_parse_from(["quarry", "rust", "--retries", "4294967295"]).is_err());
        assert!(Cli::try_parse_from(["quarry", "rust", "--retries", "11"]).is_err());
        assert!(Cli::try_parse_from(["quarry", "rust", "--timeout-ms", "0"]).is_err());
        assert!(Cli::try_parse_from(["quarry", "rust", "--timeout-ms", "300001"]).is_err());

        let cli = Cli::parse_from(["quarry", "rust", "--retries", "10", "--timeout-ms", "100"]);
        let opts = cli.search_options(&AppConfig::default());
        assert_eq!(opts.retries, 10);
        assert_eq!(opts.timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_query_required() {
        assert!(Cli::try_parse_from(["quarry"]).is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&[]), "No results.\n");

        let result = SearchResult {
            title: "Tokio".into(),
            url: "https://tokio.rs".into(),
            snippet: "An asynchronous runtime".into(),
            rank: 1,
            source: "tokio.rs".into(),
            retrieved_at: chrono::Utc::now(),
            cached: None,
        };
        let out = render(&[result]);
        assert!(out.starts_with("1. Tokio\n   https://tokio.rs\n   [tokio.rs]\n   An asynchronous runtime\n"));
    }
}
