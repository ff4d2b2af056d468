//! Router and shared state for the HTTP API.

use crate::routes;
use axum::{
    Router,
    routing::{delete, get},
};
use quarry_client::{SearchOptions, Searcher};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// State shared by every handler.
pub struct AppState {
    pub searcher: Searcher,
    /// Options applied when a request does not override them.
    pub defaults: SearchOptions,
}

pub type SharedState = Arc<AppState>;

/// Build the API router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/search", get(routes::search::search_get).post(routes::search::search_post))
        .route("/cache/stats", get(routes::cache::stats))
        .route("/cache", delete(routes::cache::clear))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
