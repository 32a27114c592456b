//! REST API endpoints.
//!
//! Axum-based HTTP API the chat front-end calls: one route per query,
//! returning the dispatcher's payload as JSON. Empty results are 200s with
//! a `no_data` payload; only malformed parameters and upstream failures
//! turn into error statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream sheet error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::query::QueryError> for ApiError {
    fn from(e: crate::query::QueryError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<crate::fetch::FetchError> for ApiError {
    fn from(e: crate::fetch::FetchError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

impl From<crate::normalize::SourceError> for ApiError {
    fn from(e: crate::normalize::SourceError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/meta", get(routes::stats::meta))
        .route("/api/recent", get(routes::stats::recent))
        .route("/api/versus", get(routes::stats::versus))
        .route("/api/decks/:deck/stats", get(routes::stats::deck_stats))
        .route("/api/decks/:deck/matchups", get(routes::stats::deck_matchups))
        .route("/api/decks/:deck/pilots", get(routes::stats::deck_pilots))
        .route("/api/decks/:deck/trend", get(routes::stats::deck_trend))
        .route("/api/matrix", get(routes::matrix::matrix))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        let resp = ApiError::BadRequest("count".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Upstream("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_from_query_error() {
        let err: ApiError = crate::query::QueryError::CountOutOfRange(42).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_api_error_from_source_error() {
        let err: ApiError = crate::normalize::SourceError::MalformedSource.into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
