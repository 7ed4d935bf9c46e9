//! Transport error types

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Transport failure with classification
///
/// `message` is diagnostic text for logs. `user_message` is the text the
/// service asked us to show the user, when it provided one.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub user_message: Option<String>,
    pub status: Option<u16>,
    /// Lower-level failure, e.g. the `reqwest::Error` behind a network error
    #[source]
    pub source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_message: None,
            status: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = Some(user_message.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Status, message).with_status(status)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection failures, timeouts, interrupted bodies
    Network,
    /// Non-2xx HTTP status
    Status,
    /// 2xx body that is not JSON or lacks a `response` string
    MalformedResponse,
    /// Anything else, including faults inside the transport itself
    Unknown,
}
