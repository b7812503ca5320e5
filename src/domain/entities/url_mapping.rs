//! URL mapping entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted mapping between a short code and the original URL.
///
/// Mappings are append-only: once stored, no field changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UrlMapping {
    /// Store-assigned identifier, used only for internal re-reads.
    pub id: i64,
    pub short_code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlMapping {
    pub fn new(id: i64, short_code: String, url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            short_code,
            url,
            created_at,
        }
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlMapping {
    pub short_code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl NewUrlMapping {
    /// Creates a mapping stamped with the current time.
    pub fn now(short_code: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            url: url.into(),
            created_at: Utc::now(),
        }
    }

    /// Attaches a store-assigned id, producing the persisted form.
    pub fn into_mapping(self, id: i64) -> UrlMapping {
        UrlMapping::new(id, self.short_code, self.url, self.created_at)
    }
}
