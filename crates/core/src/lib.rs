//! Core types and shared functionality for quarry.
//!
//! This crate provides:
//! - The `SearchResult` record produced by the parser
//! - In-memory result cache with TTL expiry and a bounded size
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod types;

pub use cache::{CacheStats, ResultCache, fingerprint};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use types::SearchResult;
