//! Events that drive the turn state machine

use crate::transport::{TransportError, TurnReply};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Raw draft text as typed, untrimmed
    UserSubmit { text: String },

    // Transport events
    ReplyReceived { reply: TurnReply },
    ReplyFailed { error: TransportError },
}

impl Event {
    pub fn user_submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }
}
