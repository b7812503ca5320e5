//! DTOs for the health endpoint.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: StoreProbe,
}

/// Outcome of one round-trip to the mapping store.
#[derive(Debug, Serialize)]
pub struct StoreProbe {
    pub status: ProbeStatus,
    pub latency_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
