//! Handler for the health endpoint.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{
    HealthChecks, HealthResponse, ProbeStatus, ServiceStatus, StoreProbe,
};
use crate::state::AppState;

/// Reports whether the mapping store answers within the store deadline.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` when the store answered, `503 Service Unavailable` otherwise:
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "latency_ms": 1 }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = probe_store(&state).await;

    let (code, status) = match store.status {
        ProbeStatus::Ok => (StatusCode::OK, ServiceStatus::Healthy),
        ProbeStatus::Error => (StatusCode::SERVICE_UNAVAILABLE, ServiceStatus::Degraded),
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks { store },
    };

    (code, Json(response))
}

async fn probe_store(state: &AppState) -> StoreProbe {
    let started = Instant::now();
    let result = state.shortener_service.ping().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => StoreProbe {
            status: ProbeStatus::Ok,
            latency_ms,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Store health probe failed");
            StoreProbe {
                status: ProbeStatus::Error,
                latency_ms,
                message: Some(e.to_string()),
            }
        }
    }
}
