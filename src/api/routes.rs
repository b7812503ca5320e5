//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned URL API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /v1/url/shorten`              - Create a short code for a URL
/// - `GET  /v1/url/shorten/{short_code}` - Look up the original URL
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/url/shorten", post(shorten_handler))
        .route("/v1/url/shorten/{short_code}", get(resolve_handler))
}
