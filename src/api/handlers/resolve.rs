//! Handler for the lookup endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the original URL for a short code.
///
/// # Endpoint
///
/// `GET /api/v1/url/shorten/{short_code}`
///
/// # Errors
///
/// - 404 if the code was never issued
/// - 503 if the store is unavailable
pub async fn resolve_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let original_url = state.shortener_service.resolve(&short_code).await?;

    Ok(Json(ResolveResponse { original_url }))
}
