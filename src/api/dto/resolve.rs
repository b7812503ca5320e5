//! DTOs for the lookup endpoint.

use serde::{Deserialize, Serialize};

/// Original URL behind a short code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub original_url: String,
}
