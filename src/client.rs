//! Outbound Web API client -- posts structured messages to named remote methods.
//!
//! A thin wrapper over one HTTPS POST per call: `{base}/{method}` with a JSON
//! body and a bearer token, decoding the platform's `{ ok, error, ... }`
//! envelope. Retries, rate limiting, and socket upkeep are the host's
//! concern.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

/// Outbound client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The platform answered with `ok: false`.
    #[error("API error: {0}")]
    Api(String),
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON deserialization failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Response envelope shared by every Web API method.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Web API client for named remote methods.
pub struct ApiClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Call a named remote method with a JSON params object.
    ///
    /// Returns the response body minus the envelope fields.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] when the platform reports `ok: false`, transport
    /// and parse failures otherwise.
    pub async fn call(&self, method: &str, params: &Value) -> Result<Value, ClientError> {
        let url = format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            method
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(params)
            .send()
            .await?;

        let envelope: ApiEnvelope = resp.json().await?;
        debug!(method, ok = envelope.ok, "Web API call completed");
        envelope_to_result(envelope)
    }

    /// Post a text message to a channel via `chat.postMessage`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiClient::call`].
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<Value, ClientError> {
        self.call(
            "chat.postMessage",
            &json!({
                "channel": channel,
                "text": text,
            }),
        )
        .await
    }
}

/// Map a decoded envelope to the caller-visible result.
fn envelope_to_result(envelope: ApiEnvelope) -> Result<Value, ClientError> {
    if !envelope.ok {
        return Err(ClientError::Api(
            envelope.error.unwrap_or_else(|| "unknown error".to_owned()),
        ));
    }
    Ok(Value::Object(envelope.rest))
}
