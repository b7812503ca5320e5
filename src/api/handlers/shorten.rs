//! Handler for the shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short code for a URL.
///
/// # Endpoint
///
/// `POST /api/v1/url/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/path?q=1" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "aZ3kP9qx",
///   "short_url": "http://localhost:3000/r/aZ3kP9qx"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the URL is invalid
/// - 500 if no unique code could be allocated
/// - 503 if the store is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let short_code = state.shortener_service.shorten(&payload.url).await?;
    let short_url = state.short_url(&short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_code,
            short_url,
        }),
    ))
}
