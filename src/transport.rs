//! Assistant transport abstraction
//!
//! One request/response exchange with the remote travel assistant. The
//! transport owns no conversation state: it forwards whatever context the
//! caller hands it and reports back what the service returned.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::{HttpTransport, TransportConfig, DEFAULT_BASE_URL};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for assistant endpoints
#[async_trait]
pub trait AssistantTransport: Send + Sync {
    /// Send one user turn. Exactly one network exchange, no retries.
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply, TransportError>;

    /// Human-readable endpoint label used in logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AssistantTransport + ?Sized> AssistantTransport for Arc<T> {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply, TransportError> {
        (**self).send_turn(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: AssistantTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: AssistantTransport> AssistantTransport for LoggingTransport<T> {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_turn(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    reply_len = reply.text.len(),
                    context_replaced = reply.context.is_some(),
                    "Assistant turn completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    has_user_message = e.user_message.is_some(),
                    "Assistant turn failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
