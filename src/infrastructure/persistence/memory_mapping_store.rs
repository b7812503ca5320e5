//! In-process implementation of the mapping store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingStore;
use crate::domain::schema::validate_new_mapping;
use crate::error::AppError;

/// Mapping store held in memory.
///
/// Mappings are keyed by short code in a sharded `DashMap`. Insertion goes through
/// the map's entry API, so two concurrent writers of the same code can never both
/// succeed. The loser gets [`AppError::Conflict`], as with the PostgreSQL unique index.
#[derive(Debug)]
pub struct MemoryMappingStore {
    by_code: DashMap<String, UrlMapping>,
    code_by_id: DashMap<i64, String>,
    next_id: AtomicI64,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self {
            by_code: DashMap::new(),
            code_by_id: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for MemoryMappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        Ok(self.by_code.contains_key(short_code))
    }

    async fn insert(&self, mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        validate_new_mapping(&mapping)?;

        let id = match self.by_code.entry(mapping.short_code.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(
                    "Short code already exists",
                    json!({ "short_code": mapping.short_code }),
                ));
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                slot.insert(mapping.clone().into_mapping(id));
                id
            }
        };

        self.code_by_id.insert(id, mapping.short_code);

        self.find_by_id(id).await
    }

    async fn find_by_code(&self, short_code: &str) -> Result<UrlMapping, AppError> {
        self.by_code
            .get(short_code)
            .map(|m| m.value().clone())
            .ok_or_else(|| {
                AppError::not_found("Short code not found", json!({ "short_code": short_code }))
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<UrlMapping, AppError> {
        let code = self
            .code_by_id
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or_else(|| AppError::not_found("Mapping not found", json!({ "id": id })))?;

        self.find_by_code(&code).await
    }

    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlMapping>, AppError> {
        let mut rows: Vec<UrlMapping> = self
            .by_code
            .iter()
            .filter(|m| m.url == url)
            .map(|m| m.value().clone())
            .collect();

        rows.sort_by_key(|m| (m.created_at, m.id));
        Ok(rows)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<UrlMapping>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);

        let mut rows: Vec<UrlMapping> = self.by_code.iter().map(|m| m.value().clone()).collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit);

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
