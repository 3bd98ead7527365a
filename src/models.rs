use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item as the upstream capability returns it. The shape is dictated by
/// the upstream; every field is defaulted so unexpected payloads still pass
/// through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub date: String,
}

/// Success envelope for `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchResult>,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_details(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream_configured: bool,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
