//! HTTP task runner for a remote `taskbridge serve`

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use taskbridge_common::{BridgeError, ErrorDescriptor, Result};

use crate::runner::TaskRunner;

/// Default request timeout; long enough for server selection plus one operation
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct TaskEnvelope<'a> {
    task: &'a str,
    arg: JsonValue,
}

/// Client for the bridge's `POST /task` endpoint
///
/// # Example
///
/// ```ignore
/// use taskbridge_client::{HttpTaskClient, MongoCommands};
///
/// let client = HttpTaskClient::new("http://127.0.0.1:3004")?;
/// client.clear_mongo_collection("test_users").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskClient {
    /// Create a client for the bridge at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TaskRunner for HttpTaskClient {
    async fn task(&self, name: &str, arg: JsonValue) -> Result<JsonValue> {
        let url = format!("{}/task", self.base_url);
        tracing::debug!("POST {} task={}", url, name);

        let response = self
            .client
            .post(&url)
            .json(&TaskEnvelope { task: name, arg })
            .send()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        let status = response.status();
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| BridgeError::Transport(format!("Invalid response body: {}", e)))?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::NOT_FOUND => Err(BridgeError::UnknownTask(name.to_string())),
            s => {
                let message = ErrorDescriptor::from_value(&body)
                    .map(|d| d.error)
                    .unwrap_or_else(|| body.to_string());
                Err(BridgeError::Transport(format!("HTTP {}: {}", s, message)))
            }
        }
    }
}
