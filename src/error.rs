//! Application error taxonomy and HTTP error responses.
//!
//! Every fallible operation in the service returns [`AppError`]. The variants map
//! one-to-one to the failure kinds callers can act on:
//!
//! - [`AppError::Validation`] - malformed input or a write rejected by the store schema
//! - [`AppError::NotFound`] - lookup miss
//! - [`AppError::Conflict`] - uniqueness violation (recovered inside the allocator)
//! - [`AppError::ResourceExhausted`] - collision retry budget exceeded
//! - [`AppError::StoreUnavailable`] - connectivity, timeout or unexpected store fault

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::error::ErrorKind;

use crate::utils::db_error::{SHORT_CODE_UNIQUE_CONSTRAINT, is_unique_violation_on_code};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload used in API responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    ResourceExhausted { message: String, details: Value },

    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn resource_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::ResourceExhausted {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    /// Machine-readable error code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::ResourceExhausted { .. } => "resource_exhausted",
            AppError::StoreUnavailable { .. } => "store_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::ResourceExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details }
            | AppError::ResourceExhausted { message, details }
            | AppError::StoreUnavailable { message, details } => (message, details),
        };

        ErrorInfo {
            code: self.code(),
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        AppError::bad_request("Request validation failed", Value::Object(fields))
    }
}

/// Translates a database error into the application taxonomy.
///
/// Only a collision on the short code index is a [`AppError::Conflict`]; the
/// allocator retries those. Check and not-null violations are client errors.
/// Everything else (other unique indexes, pool exhaustion, I/O, protocol
/// errors) means the store is unavailable.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::RowNotFound = e {
        return AppError::not_found("Record not found", json!({}));
    }

    if is_unique_violation_on_code(&e) {
        return AppError::conflict(
            "Short code already exists",
            json!({ "constraint": SHORT_CODE_UNIQUE_CONSTRAINT }),
        );
    }

    if let Some(db) = e.as_database_error()
        && matches!(
            db.kind(),
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation
        )
    {
        return AppError::bad_request(
            "Schema validation rejected the write",
            json!({ "constraint": db.constraint() }),
        );
    }

    AppError::store_unavailable("Database error", json!({ "reason": e.to_string() }))
}
