//! Store trait for URL mapping persistence.

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable collection of URL mappings keyed by short code.
///
/// Implementations enforce short code uniqueness and field formats themselves,
/// independent of any validation done by callers. Every method is a single atomic
/// store operation, so dropping the returned future never leaves partial state.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryMappingStore`] - in-process
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Returns whether a mapping with this short code exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on store faults.
    async fn exists(&self, short_code: &str) -> Result<bool, AppError>;

    /// Persists a new mapping and returns it with its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    ///
    /// Returns [`AppError::Validation`] if the short code or URL violates its format.
    ///
    /// Returns [`AppError::StoreUnavailable`] on store faults.
    async fn insert(&self, mapping: NewUrlMapping) -> Result<UrlMapping, AppError>;

    /// Finds a mapping by short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this code.
    async fn find_by_code(&self, short_code: &str) -> Result<UrlMapping, AppError>;

    /// Finds a mapping by its store-assigned id.
    ///
    /// Used to re-read a row right after it was written; not exposed publicly.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this id.
    async fn find_by_id(&self, id: i64) -> Result<UrlMapping, AppError>;

    /// Returns every mapping issued for `url`, oldest first.
    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlMapping>, AppError>;

    /// Returns up to `limit` mappings, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<UrlMapping>, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
