//! HTTP transport for the travel assistant API

use super::types::{HealthStatus, TurnReply, TurnRequest};
use super::{AssistantTransport, TransportError};
use crate::context::ConversationContext;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Connection settings for [`HttpTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Whole-request timeout. `None` waits for the service indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Talks to `POST {base}/chat` and `GET {base}/health`
pub struct HttpTransport {
    client: Client,
    chat_url: String,
    health_url: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let base = config.base_url.trim_end_matches('/');

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: format!("{base}/chat"),
            health_url: format!("{base}/health"),
        })
    }

    /// Probe the service's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns the same error classes as [`AssistantTransport::send_turn`].
    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(body_error)?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            TransportError::malformed(format!("Invalid health body: {e}")).with_source(e)
        })
    }
}

#[async_trait]
impl AssistantTransport for HttpTransport {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply, TransportError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(body_error)?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        parse_reply(&body)
    }

    fn endpoint(&self) -> &str {
        &self.chat_url
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    let err = if e.is_timeout() {
        TransportError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::network(format!("Connection failed: {e}"))
    } else {
        TransportError::unknown(format!("Request failed: {e}"))
    };
    err.with_source(e)
}

fn body_error(e: reqwest::Error) -> TransportError {
    let message = if e.is_timeout() {
        format!("Request timeout: {e}")
    } else {
        format!("Failed to read response: {e}")
    };
    TransportError::network(message).with_source(e)
}

/// Non-2xx: keep the service's own apology text if it sent one.
fn classify_error(status: StatusCode, body: &str) -> TransportError {
    let err = TransportError::status(status.as_u16(), format!("HTTP {status}: {body}"));
    match fallback_message(body) {
        Some(text) => err.with_user_message(text),
        None => err,
    }
}

/// `response` at the top level, or nested under `detail` as the backend's
/// exception handler emits it. Empty strings do not count.
fn fallback_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("response")
        .and_then(Value::as_str)
        .or_else(|| {
            parsed
                .get("detail")
                .and_then(|d| d.get("response"))
                .and_then(Value::as_str)
        })
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn parse_reply(body: &str) -> Result<TurnReply, TransportError> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        TransportError::malformed(format!("Failed to parse response: {e} - body: {body}"))
            .with_source(e)
    })?;

    let text = parsed
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TransportError::malformed(format!("Missing `response` field - body: {body}"))
        })?
        .to_string();

    let context = match parsed.get("context") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let context = ConversationContext::from_value(value.clone());
            if context.is_none() {
                tracing::warn!(context = %value, "Ignoring non-object context in reply");
            }
            context
        }
    };

    Ok(TurnReply { text, context })
}
