//! Field formats for URL mappings.
//!
//! These rules are enforced twice: by the allocator before it talks to the store,
//! and by every store before it accepts a write. The PostgreSQL migration carries
//! the same patterns as `CHECK` constraints.

use crate::domain::entities::NewUrlMapping;
use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Length of every short code.
pub const SHORT_CODE_LENGTH: usize = 8;

pub const SHORT_CODE_PATTERN: &str = r"^[a-zA-Z0-9]{8}$";
pub const URL_PATTERN: &str = r"^https?://.+";

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHORT_CODE_PATTERN).expect("short code pattern is valid"));

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("url pattern is valid"));

pub fn is_valid_short_code(code: &str) -> bool {
    SHORT_CODE_REGEX.is_match(code)
}

pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// Checks a URL against [`URL_PATTERN`].
///
/// # Errors
///
/// Returns [`AppError::Validation`] when the URL does not start with
/// `http://` or `https://` followed by at least one character.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if !is_valid_url(url) {
        return Err(AppError::bad_request(
            "URL must start with http:// or https://",
            json!({ "url": url, "pattern": URL_PATTERN }),
        ));
    }
    Ok(())
}

/// Checks a short code against [`SHORT_CODE_PATTERN`].
///
/// # Errors
///
/// Returns [`AppError::Validation`] unless the code is exactly 8 ASCII alphanumerics.
pub fn validate_short_code(code: &str) -> Result<(), AppError> {
    if !is_valid_short_code(code) {
        return Err(AppError::bad_request(
            "Short code must be exactly 8 alphanumeric characters",
            json!({ "short_code": code, "pattern": SHORT_CODE_PATTERN }),
        ));
    }
    Ok(())
}

/// Validates a mapping before it is written.
pub fn validate_new_mapping(mapping: &NewUrlMapping) -> Result<(), AppError> {
    validate_short_code(&mapping.short_code)?;
    validate_url(&mapping.url)
}
