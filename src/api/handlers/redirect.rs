//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /r/{short_code}`
///
/// Responds with `301 Moved Permanently`: mappings never change, so clients
/// may cache the redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.shortener_service.resolve(&short_code).await?;

    debug!(short_code = %short_code, "Redirecting");

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, url)]))
}
