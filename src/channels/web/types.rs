//! Response DTOs for the HTTP channel.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub agent: String,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok(agent: impl Into<String>) -> Self {
        Self {
            status: "ok",
            agent: agent.into(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}
