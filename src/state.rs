//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::repositories::MappingStore;

/// State shared by every request.
///
/// Cloning is cheap: all members are reference-counted and read-only.
#[derive(Clone)]
pub struct AppState {
    pub shortener_service: Arc<ShortenerService<dyn MappingStore>>,
    pub base_url: String,
}

impl AppState {
    pub fn new(
        shortener_service: Arc<ShortenerService<dyn MappingStore>>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener_service,
            base_url: base_url.into(),
        }
    }

    /// Builds state around `store` with a default-configured service.
    pub fn with_store(store: Arc<dyn MappingStore>, base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(ShortenerService::new(store)), base_url)
    }

    /// Public redirect URL for a short code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/r/{}", self.base_url.trim_end_matches('/'), short_code)
    }
}
