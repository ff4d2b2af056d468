//! `/search` endpoints.
//!
//! Both verbs share validation: `query` is required and non-blank, `max`
//! is clamped to 1..=50, and omitted fields fall back to server defaults.

use crate::error::ApiError;
use crate::handler::SharedState;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use quarry_client::{SearchOptions, SearchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `max`.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Query string for `GET /search`.
///
/// Numeric fields arrive as strings so malformed values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub max: Option<String>,
    pub rate_limit: Option<String>,
    pub cache: Option<String>,
}

/// JSON body for `POST /search`.
///
/// A fractional `max` is truncated before clamping.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    pub query: Option<String>,
    pub max: Option<f64>,
    pub rate_limit: Option<u64>,
    pub use_cache: Option<bool>,
}

/// Successful search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Clamp a requested result count to 1..=50.
pub fn clamp_max(max: i64) -> usize {
    max.clamp(1, MAX_RESULTS_LIMIT as i64) as usize
}

fn options(
    defaults: &SearchOptions, max: Option<i64>, rate_limit: Option<u64>, use_cache: Option<bool>,
) -> SearchOptions {
    SearchOptions {
        max: max.map(clamp_max).unwrap_or(defaults.max),
        rate_limit: rate_limit.map(Duration::from_millis).unwrap_or(defaults.rate_limit),
        use_cache: use_cache.unwrap_or(defaults.use_cache),
        ..defaults.clone()
    }
}

fn required_query(query: Option<String>, field: &str) -> Result<String, ApiError> {
    match query {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ApiError::BadRequest(format!("Query parameter \"{}\" is required", field))),
    }
}

async fn run(state: &SharedState, query: String, options: SearchOptions) -> Result<Json<SearchResponse>, ApiError> {
    let results = state.searcher.search(&query, &options).await?;
    tracing::info!(query = %query, count = results.len(), "search completed");

    Ok(Json(SearchResponse { query, count: results.len(), results, timestamp: Utc::now() }))
}

/// `GET /search?q=&max=&rateLimit=&cache=`
pub async fn search_get(
    State(state): State<SharedState>, Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = required_query(params.q, "q")?;
    let max = params.max.and_then(|m| m.trim().parse::<i64>().ok());
    let rate_limit = params.rate_limit.and_then(|r| r.trim().parse::<u64>().ok());
    let use_cache = params.cache.map(|c| c != "false");

    let opts = options(&state.defaults, max, rate_limit, use_cache);
    run(&state, query, opts).await
}

/// `POST /search` with `{query, max, rateLimit, useCache}`.
pub async fn search_post(
    State(state): State<SharedState>, payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let query = required_query(body.query, "query")?;
    let max = body.max.map(|m| m.trunc() as i64);
    let opts = options(&state.defaults, max, body.rate_limit, body.use_cache);
    run(&state, query, opts).await
}
