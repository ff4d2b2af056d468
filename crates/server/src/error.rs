//! Structured errors for the quarry server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request failed validation before reaching the searcher.
    #[error("{0}")]
    BadRequest(String),

    /// Search pipeline failure.
    #[error(transparent)]
    Search(#[from] quarry_core::Error),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody { error: msg.clone(), message: None }),
            ApiError::Search(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, ErrorBody { error: e.to_string(), message: None })
            }
            ApiError::Search(e) => {
                tracing::error!("search error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "Search failed".into(), message: Some(e.to_string()) },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
