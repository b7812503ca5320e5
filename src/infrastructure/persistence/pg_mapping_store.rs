//! PostgreSQL implementation of the mapping store.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use std::sync::Arc;

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingStore;
use crate::domain::schema::validate_new_mapping;
use crate::error::AppError;

const SELECT_COLUMNS: &str = "SELECT id, short_code, url, created_at FROM url_mappings";

/// PostgreSQL store for URL mappings.
///
/// The `url_mappings` table carries `CHECK` constraints mirroring
/// [`crate::domain::schema`] and a unique index on `short_code`, so integrity
/// holds even for writes that bypass this type.
pub struct PgMappingStore {
    pool: Arc<PgPool>,
}

impl PgMappingStore {
    /// Creates a new store over a shared connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Creates the `url_mappings` table and its indexes.
    ///
    /// Idempotent: applied migrations are tracked by sqlx and every statement
    /// uses `IF NOT EXISTS`, so running this again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError`] if the schema cannot be applied or verified.
    /// Callers must treat this as fatal.
    pub async fn init_schema(pool: &PgPool) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        tracing::info!("url_mappings schema ready");
        Ok(())
    }
}

#[async_trait]
impl MappingStore for PgMappingStore {
    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM url_mappings WHERE short_code = $1)")
                .bind(short_code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn insert(&self, mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        validate_new_mapping(&mapping)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO url_mappings (short_code, url, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&mapping.short_code)
        .bind(&mapping.url)
        .bind(mapping.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        self.find_by_id(id).await
    }

    async fn find_by_code(&self, short_code: &str) -> Result<UrlMapping, AppError> {
        sqlx::query_as::<_, UrlMapping>(&format!("{SELECT_COLUMNS} WHERE short_code = $1"))
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short code not found", json!({ "short_code": short_code }))
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<UrlMapping, AppError> {
        sqlx::query_as::<_, UrlMapping>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::not_found("Mapping not found", json!({ "id": id })))
    }

    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, UrlMapping>(&format!(
            "{SELECT_COLUMNS} WHERE url = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(url)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, UrlMapping>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
