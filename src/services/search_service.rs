use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::SearchSettings;
use crate::models::SearchResult;

/// Failures from the upstream web-search capability. The `Display` text of
/// the variant becomes the `message` field of the 500 envelope.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("search upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected search payload: {0}")]
    Decode(String),
}

/// Seam between the search handler and the wire. The hosted capability is a
/// black box; implementations only promise "takes a query and a count,
/// returns a list or fails".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, query: &str, count: u32) -> Result<Vec<SearchResult>>;
}

/// HTTP backend for the hosted web-search function. Sends
/// `{"query": ..., "num": ...}` and expects a JSON array of results (or
/// `null` when the upstream has nothing).
pub struct HttpSearchBackend {
    client: reqwest::Client,
    settings: SearchSettings,
}

impl HttpSearchBackend {
    pub fn new(settings: SearchSettings) -> Result<Self> {
        // No request timeout: latency is inherited from the upstream.
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn fetch(&self, query: &str, count: u32) -> Result<Vec<SearchResult>> {
        let mut request = self
            .client
            .post(&self.settings.api_url)
            .json(&json!({ "query": query, "num": count }));
        if !self.settings.api_key.is_empty() {
            request = request.bearer_auth(&self.settings.api_key);
        }

        let response = request.send().await.map_err(SearchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: Value = response.json().await.map_err(SearchError::Transport)?;
        Ok(decode_results(payload)?)
    }
}

/// The upstream replies with an array of items or nothing at all; nothing is
/// coerced to an empty list. Item order is preserved as received.
fn decode_results(payload: Value) -> Result<Vec<SearchResult>, SearchError> {
    match payload {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => {
            serde_json::from_value(payload).map_err(|e| SearchError::Decode(e.to_string()))
        }
        other => Err(SearchError::Decode(format!(
            "expected an array of results, got {}",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    result_count: u32,
}

impl SearchService {
    pub fn new(settings: SearchSettings) -> Result<Self> {
        let result_count = settings.result_count;
        let backend = HttpSearchBackend::new(settings)?;
        Ok(Self {
            backend: Arc::new(backend),
            result_count,
        })
    }

    pub fn with_backend(backend: Arc<dyn SearchBackend>, result_count: u32) -> Self {
        Self {
            backend,
            result_count,
        }
    }

    /// Forwards one query to the upstream with the configured result count.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.backend.fetch(query, self.result_count).await
    }
}
