//! Cache inspection and purge endpoints.

use crate::handler::SharedState;
use axum::{Json, extract::State, http::StatusCode};
use quarry_client::CacheStats;

/// `GET /cache/stats`: stats, or `null` before the first cached search.
pub async fn stats(State(state): State<SharedState>) -> Json<Option<CacheStats>> {
    Json(state.searcher.cache_stats().await)
}

/// `DELETE /cache`: empty the result cache.
pub async fn clear(State(state): State<SharedState>) -> StatusCode {
    state.searcher.clear_cache().await;
    tracing::info!("result cache cleared");
    StatusCode::NO_CONTENT
}
