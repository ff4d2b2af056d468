//! Client code for quarry.
//!
//! This crate provides the rate-limited fetch pipeline, results page
//! parsing, and the search orchestrator shared by the server and CLI.

pub mod fetch;
pub mod parse;
pub mod search;

pub use fetch::{FetchClient, FetchOptions, HostRateLimiter, RobotsRules, normalize_url};
pub use parse::{ParseOptions, parse_results};
pub use search::{SearchOptions, Searcher, SearcherConfig};

pub use quarry_core::{CacheStats, Error, SearchResult};
