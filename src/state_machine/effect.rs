//! Effects produced by state transitions

use crate::context::ConversationContext;
use crate::session::Sender;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message stamped with the current time
    AppendMessage { sender: Sender, text: String },

    /// Swap in the context the service returned
    ReplaceContext { context: ConversationContext },

    /// Toggle the session's in-flight flag
    SetBusy { busy: bool },

    /// Tell the renderer its draft was accepted
    ClearDraft,

    /// Send the turn to the assistant with the session's current context
    SendTurn { message: String },

    /// Notify subscribers that the turn resolved
    NotifyTurnDone { success: bool },
}

impl Effect {
    pub fn append_user_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn append_bot_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::Bot,
            text: text.into(),
        }
    }

    /// True for effects that change session state
    pub fn mutates_session(&self) -> bool {
        matches!(
            self,
            Effect::AppendMessage { .. } | Effect::ReplaceContext { .. } | Effect::SetBusy { .. }
        )
    }
}
