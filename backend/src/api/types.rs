//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Number of stored submissions.
    pub records: i64,
}

impl HealthResponse {
    pub fn ok(records: i64) -> Self {
        Self {
            status: "ok".to_string(),
            service: "voices".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            records,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
