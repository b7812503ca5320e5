//! Short code allocation and resolution service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingStore;
use crate::domain::schema::{is_valid_short_code, validate_url};
use crate::error::AppError;
use crate::utils::code_generator::generate_code;

/// Default number of candidate codes tried per `shorten` call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default deadline for a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for [`ShortenerService::recent`].
pub const MAX_RECENT_LIMIT: i64 = 1000;

/// Allocates short codes for URLs and resolves them back.
///
/// Holds no mutable state; one instance is shared by all requests. Code
/// uniqueness under concurrency is delegated to the store's constraint: the
/// existence check only narrows the race window, and an insert that loses the
/// race is retried exactly like a detected collision.
pub struct ShortenerService<S: MappingStore + ?Sized> {
    store: Arc<S>,
    max_attempts: u32,
    store_timeout: Duration,
}

impl<S: MappingStore + ?Sized> ShortenerService<S> {
    /// Creates a service with the default retry budget and store deadline.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Sets how many candidate codes a single `shorten` call may try (at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the deadline applied to every store round-trip.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Creates a mapping for `url` and returns its new short code.
    ///
    /// # Algorithm
    ///
    /// 1. Revalidate the URL against `^https?://.+`
    /// 2. Draw a random candidate code and ask the store whether it exists
    /// 3. On collision, draw again
    /// 4. Insert the mapping; a [`AppError::Conflict`] from the insert means a
    ///    concurrent writer took the code, so draw again
    ///
    /// Candidates are tried sequentially, at most `max_attempts` times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is malformed.
    ///
    /// Returns [`AppError::ResourceExhausted`] if every attempt collided.
    ///
    /// Returns [`AppError::StoreUnavailable`] on store faults or timeouts;
    /// these are not retried here.
    pub async fn shorten(&self, url: &str) -> Result<String, AppError> {
        validate_url(url)?;

        for attempt in 1..=self.max_attempts {
            let code = generate_code();

            if self.call("exists", self.store.exists(&code)).await? {
                debug!(attempt, short_code = %code, "Short code collision, regenerating");
                metrics::counter!("shortener_collisions_total", "stage" => "exists").increment(1);
                continue;
            }

            let new_mapping = NewUrlMapping::now(code.clone(), url);

            match self.call("insert", self.store.insert(new_mapping)).await {
                Ok(mapping) => {
                    info!(
                        short_code = %mapping.short_code,
                        id = mapping.id,
                        attempt,
                        "URL shortened"
                    );
                    return Ok(mapping.short_code);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, short_code = %code, "Short code taken by a concurrent insert, regenerating");
                    metrics::counter!("shortener_collisions_total", "stage" => "insert")
                        .increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        metrics::counter!("shortener_exhausted_total").increment(1);
        warn!(
            attempts = self.max_attempts,
            "Gave up allocating a short code"
        );

        Err(AppError::resource_exhausted(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": self.max_attempts }),
        ))
    }

    /// Returns the original URL for `short_code`.
    ///
    /// Codes that cannot exist (wrong length or characters) are reported as
    /// not found without a store round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this code.
    ///
    /// Returns [`AppError::StoreUnavailable`] on store faults or timeouts.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if !is_valid_short_code(short_code) {
            return Err(AppError::not_found(
                "Short code not found",
                json!({ "short_code": short_code }),
            ));
        }

        let mapping = self
            .call("find_by_code", self.store.find_by_code(short_code))
            .await?;

        Ok(mapping.url)
    }

    /// Returns every mapping issued for `url`, oldest first.
    pub async fn find_by_url(&self, url: &str) -> Result<Vec<UrlMapping>, AppError> {
        validate_url(url)?;
        self.call("find_by_url", self.store.find_by_url(url)).await
    }

    /// Returns the newest mappings, newest first. `limit` is clamped to 1..=1000.
    pub async fn recent(&self, limit: i64) -> Result<Vec<UrlMapping>, AppError> {
        let limit = limit.clamp(1, MAX_RECENT_LIMIT);
        self.call("list_recent", self.store.list_recent(limit)).await
    }

    /// Checks that the store answers within the configured deadline.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.call("ping", self.store.ping()).await
    }

    /// Runs one store operation under the configured deadline.
    ///
    /// On timeout the operation future is dropped; store operations are
    /// single atomic statements, so nothing is left half-written.
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.store_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(operation, timeout_ms, "Store operation timed out");
                Err(AppError::store_unavailable(
                    "Store operation timed out",
                    json!({ "operation": operation, "timeout_ms": timeout_ms }),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stored(new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        Ok(new_mapping.into_mapping(1))
    }

    fn store_down() -> AppError {
        AppError::store_unavailable("Database error", json!({}))
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut mock_store = MockMappingStore::new();
        let inserted = Arc::new(Mutex::new(None::<String>));

        mock_store
            .expect_exists()
            .times(1)
            .returning(|_| Ok(false));

        let inserted_clone = inserted.clone();
        mock_store
            .expect_insert()
            .times(1)
            .returning(move |new_mapping| {
                assert_eq!(new_mapping.url, "https://example.com/path?q=1");
                *inserted_clone.lock().unwrap() = Some(new_mapping.short_code.clone());
                stored(new_mapping)
            });

        let service = ShortenerService::new(Arc::new(mock_store));

        let code = service
            .shorten("https://example.com/path?q=1")
            .await
            .unwrap();

        assert!(is_valid_short_code(&code));
        assert_eq!(inserted.lock().unwrap().as_deref(), Some(code.as_str()));
    }

    #[tokio::test]
    async fn test_shorten_invalid_url() {
        let mut mock_store = MockMappingStore::new();
        mock_store.expect_exists().times(0);
        mock_store.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_store));

        for url in ["not-a-url", "ftp://example.com", "https://", ""] {
            let err = service.shorten(url).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{url}");
        }
    }

    #[tokio::test]
    async fn test_shorten_recovers_from_collisions() {
        const COLLISIONS: usize = 3;

        let mut mock_store = MockMappingStore::new();
        let collided = Arc::new(Mutex::new(Vec::<String>::new()));

        let collided_clone = collided.clone();
        mock_store
            .expect_exists()
            .times(COLLISIONS + 1)
            .returning(move |code| {
                let mut seen = collided_clone.lock().unwrap();
                if seen.len() < COLLISIONS {
                    seen.push(code.to_string());
                    Ok(true)
                } else {
                    Ok(false)
                }
            });

        mock_store
            .expect_insert()
            .times(1)
            .returning(stored);

        let service = ShortenerService::new(Arc::new(mock_store));

        let code = service.shorten("https://example.com").await.unwrap();

        let collided = collided.lock().unwrap();
        assert_eq!(collided.len(), COLLISIONS);
        assert!(!collided.contains(&code));
    }

    #[tokio::test]
    async fn test_shorten_exhausts_retry_budget() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_exists()
            .times(DEFAULT_MAX_ATTEMPTS as usize)
            .returning(|_| Ok(true));
        mock_store.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::ResourceExhausted { .. }));
        assert_eq!(err.to_error_info().details["attempts"], DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_shorten_respects_custom_budget() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_exists()
            .times(3)
            .returning(|_| Ok(true));

        let service = ShortenerService::new(Arc::new(mock_store)).with_max_attempts(3);

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::ResourceExhausted { .. }));
    }

    #[tokio::test]
    async fn test_shorten_collisions_within_budget_succeed() {
        let mut mock_store = MockMappingStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        mock_store
            .expect_exists()
            .times(5)
            .returning(move |_| Ok(calls_clone.fetch_add(1, Ordering::SeqCst) < 4));
        mock_store.expect_insert().times(1).returning(stored);

        let service = ShortenerService::new(Arc::new(mock_store)).with_max_attempts(5);

        assert!(service.shorten("https://example.com").await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_shorten_retries_insert_conflict() {
        let mut mock_store = MockMappingStore::new();
        let inserts = Arc::new(Mutex::new(Vec::<String>::new()));

        mock_store
            .expect_exists()
            .times(2)
            .returning(|_| Ok(false));

        let inserts_clone = inserts.clone();
        mock_store
            .expect_insert()
            .times(2)
            .returning(move |new_mapping| {
                let mut seen = inserts_clone.lock().unwrap();
                seen.push(new_mapping.short_code.clone());
                if seen.len() == 1 {
                    Err(AppError::conflict(
                        "Short code already exists",
                        json!({ "short_code": new_mapping.short_code }),
                    ))
                } else {
                    stored(new_mapping)
                }
            });

        let service = ShortenerService::new(Arc::new(mock_store));

        let code = service.shorten("https://example.com").await.unwrap();

        let inserts = inserts.lock().unwrap();
        assert_eq!(inserts.len(), 2);
        assert_eq!(inserts[1], code);
    }

    #[tokio::test]
    async fn test_shorten_insert_conflicts_count_against_budget() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_exists()
            .times(4)
            .returning(|_| Ok(false));
        mock_store.expect_insert().times(4).returning(|_| {
            Err(AppError::conflict("Short code already exists", json!({})))
        });

        let service = ShortenerService::new(Arc::new(mock_store)).with_max_attempts(4);

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::ResourceExhausted { .. }));
    }

    #[tokio::test]
    async fn test_shorten_store_fault_is_not_retried() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_exists()
            .times(1)
            .returning(|_| Err(store_down()));
        mock_store.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_shorten_insert_fault_propagates_unchanged() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_store
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::bad_request("Schema validation rejected the write", json!({}))));

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_find_by_code()
            .times(1)
            .returning(|code| {
                Ok(UrlMapping::new(
                    7,
                    code.to_string(),
                    "https://example.com/path?q=1".to_string(),
                    Utc::now(),
                ))
            });

        let service = ShortenerService::new(Arc::new(mock_store));

        let url = service.resolve("abcd1234").await.unwrap();
        assert_eq!(url, "https://example.com/path?q=1");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_find_by_code()
            .times(1)
            .returning(|code| {
                Err(AppError::not_found(
                    "Short code not found",
                    json!({ "short_code": code }),
                ))
            });

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.resolve("ZZZZZZZZ").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_store() {
        let mut mock_store = MockMappingStore::new();
        mock_store.expect_find_by_code().times(0);

        let service = ShortenerService::new(Arc::new(mock_store));

        for code in ["", "short", "toolong123", "abc-1234"] {
            let err = service.resolve(code).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }), "{code}");
        }
    }

    #[tokio::test]
    async fn test_resolve_store_fault() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_find_by_code()
            .times(1)
            .returning(|_| Err(store_down()));

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.resolve("abcd1234").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_recent_clamps_limit() {
        let mut mock_store = MockMappingStore::new();

        mock_store
            .expect_list_recent()
            .withf(|limit| *limit == MAX_RECENT_LIMIT)
            .times(1)
            .returning(|_| Ok(vec![]));
        mock_store
            .expect_list_recent()
            .withf(|limit| *limit == 1)
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = ShortenerService::new(Arc::new(mock_store));

        assert!(service.recent(1_000_000).await.unwrap().is_empty());
        assert!(service.recent(-5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_url_validates_input() {
        let mut mock_store = MockMappingStore::new();
        mock_store.expect_find_by_url().times(0);

        let service = ShortenerService::new(Arc::new(mock_store));

        let err = service.find_by_url("example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    /// Store whose every call outlives any reasonable deadline.
    struct StalledStore;

    #[async_trait]
    impl MappingStore for StalledStore {
        async fn exists(&self, _short_code: &str) -> Result<bool, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(false)
        }

        async fn insert(&self, mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(mapping.into_mapping(1))
        }

        async fn find_by_code(&self, short_code: &str) -> Result<UrlMapping, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(AppError::not_found("Short code not found", json!({ "short_code": short_code })))
        }

        async fn find_by_id(&self, id: i64) -> Result<UrlMapping, AppError> {
            Err(AppError::not_found("Mapping not found", json!({ "id": id })))
        }

        async fn find_by_url(&self, _url: &str) -> Result<Vec<UrlMapping>, AppError> {
            Ok(vec![])
        }

        async fn list_recent(&self, _limit: i64) -> Result<Vec<UrlMapping>, AppError> {
            Ok(vec![])
        }

        async fn ping(&self) -> Result<(), AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_timeout_surfaces_store_unavailable() {
        let service = ShortenerService::new(Arc::new(StalledStore))
            .with_store_timeout(Duration::from_millis(20));

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
        assert_eq!(err.to_error_info().details["operation"], "exists");

        let err = service.resolve("abcd1234").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
        assert_eq!(err.to_error_info().details["operation"], "find_by_code");
    }

    #[tokio::test]
    async fn test_ping_honors_store_timeout() {
        let service = ShortenerService::new(Arc::new(StalledStore))
            .with_store_timeout(Duration::from_millis(20));

        let err = service.ping().await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
        assert_eq!(err.to_error_info().details["operation"], "ping");
    }
}
