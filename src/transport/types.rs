//! Request and reply types for assistant turns

use crate::context::ConversationContext;
use serde::{Deserialize, Serialize};

/// One user turn as sent to the assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRequest {
    pub message: String,
    pub context: ConversationContext,
}

impl TurnRequest {
    pub fn new(message: impl Into<String>, context: ConversationContext) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }
}

/// Successful assistant reply
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// Reply text, passed through untouched (may contain markdown)
    pub text: String,
    /// Replacement context, when the service returned one
    pub context: Option<ConversationContext>,
}

impl TurnReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Body of the service's health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
