//! Conversation session state
//!
//! Pure storage: the message log, the latest context and the busy flag.
//! Validation and sequencing live in the state machine and runtime.

mod types;

pub use types::{Message, Sender, SessionSnapshot};

use crate::context::ConversationContext;
use chrono::{DateTime, Utc};

pub const DEFAULT_GREETING: &str = concat!(
    "Hi there! I'm your AI travel assistant. I can help you find flights, hotels, ",
    "and vacation packages. Ask me anything about travel!"
);

/// Single in-memory conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    messages: Vec<Message>,
    context: ConversationContext,
    busy: bool,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session opened by a bot greeting
    pub fn with_greeting(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        let mut session = Self::new();
        session.append_message(Message::bot(text, at));
        session
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn replace_context(&mut self, context: ConversationContext) {
        self.context = context;
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            context: self.context.clone(),
            busy: self.busy,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|m| m.timestamp)
    }
}
