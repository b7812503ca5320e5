#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use url_forge::AppError;
use url_forge::application::services::ShortenerService;
use url_forge::domain::entities::{NewUrlMapping, UrlMapping};
use url_forge::domain::repositories::MappingStore;
use url_forge::infrastructure::persistence::{MemoryMappingStore, PgMappingStore};
use url_forge::routes::router;
use url_forge::state::AppState;

pub const BASE_URL: &str = "http://localhost:3000";

pub fn create_test_state() -> (AppState, Arc<MemoryMappingStore>) {
    let store = Arc::new(MemoryMappingStore::new());
    let state = AppState::with_store(store.clone(), BASE_URL);
    (state, store)
}

pub fn create_pg_state(pool: PgPool) -> AppState {
    let store = Arc::new(PgMappingStore::new(Arc::new(pool)));
    AppState::with_store(store, BASE_URL)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

pub async fn insert_mapping(pool: &PgPool, code: &str, url: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO url_mappings (short_code, url) VALUES ($1, $2) RETURNING id")
        .bind(code)
        .bind(url)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Store whose every call fails as if the database were down.
pub struct UnavailableStore;

fn down() -> AppError {
    AppError::store_unavailable("connection refused", json!({}))
}

#[async_trait]
impl MappingStore for UnavailableStore {
    async fn exists(&self, _short_code: &str) -> Result<bool, AppError> {
        Err(down())
    }

    async fn insert(&self, _mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        Err(down())
    }

    async fn find_by_code(&self, _short_code: &str) -> Result<UrlMapping, AppError> {
        Err(down())
    }

    async fn find_by_id(&self, _id: i64) -> Result<UrlMapping, AppError> {
        Err(down())
    }

    async fn find_by_url(&self, _url: &str) -> Result<Vec<UrlMapping>, AppError> {
        Err(down())
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<UrlMapping>, AppError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(down())
    }
}

/// Store that only answers after a long pause.
pub struct StalledStore;

async fn stall() {
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
}

#[async_trait]
impl MappingStore for StalledStore {
    async fn exists(&self, _short_code: &str) -> Result<bool, AppError> {
        stall().await;
        Ok(false)
    }

    async fn insert(&self, mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        stall().await;
        Ok(mapping.into_mapping(1))
    }

    async fn find_by_code(&self, _short_code: &str) -> Result<UrlMapping, AppError> {
        stall().await;
        Err(down())
    }

    async fn find_by_id(&self, _id: i64) -> Result<UrlMapping, AppError> {
        stall().await;
        Err(down())
    }

    async fn find_by_url(&self, _url: &str) -> Result<Vec<UrlMapping>, AppError> {
        stall().await;
        Ok(vec![])
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<UrlMapping>, AppError> {
        stall().await;
        Ok(vec![])
    }

    async fn ping(&self) -> Result<(), AppError> {
        stall().await;
        Ok(())
    }
}

/// State over a stalled store with a short per-call deadline.
pub fn create_stalled_state(deadline: std::time::Duration) -> AppState {
    let store: Arc<dyn MappingStore> = Arc::new(StalledStore);
    let service = ShortenerService::new(store).with_store_timeout(deadline);
    AppState::new(Arc::new(service), BASE_URL)
}
