//! Pure state transition function
//!
//! Given the same state and event this always yields the same new state and
//! effects.

use super::{Effect, Event, TurnState};
use crate::transport::TurnReply;
use thiserror::Error;

/// Shown when a turn fails and the service gave us nothing better to say
pub const GENERIC_FALLBACK: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is not applied
///
/// `EmptyInput` and `Busy` are expected rejections and are dropped silently
/// by the runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty after trimming")]
    EmptyInput,
    #[error("A turn is already in flight")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, TransitionError::EmptyInput | TransitionError::Busy)
    }
}

/// Pure transition function
pub fn transition(state: &TurnState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + UserSubmit -> AwaitingReply
        (TurnState::Idle, Event::UserSubmit { text }) => {
            let message = text.trim();
            if message.is_empty() {
                return Err(TransitionError::EmptyInput);
            }

            Ok(TransitionResult::new(TurnState::AwaitingReply)
                .with_effect(Effect::append_user_message(message))
                .with_effect(Effect::SetBusy { busy: true })
                .with_effect(Effect::ClearDraft)
                .with_effect(Effect::SendTurn {
                    message: message.to_string(),
                }))
        }

        // One turn at a time
        (TurnState::AwaitingReply, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        // AwaitingReply + ReplyReceived -> Idle
        (TurnState::AwaitingReply, Event::ReplyReceived { reply }) => {
            let TurnReply { text, context } = reply;

            let mut result = TransitionResult::new(TurnState::Idle);
            if let Some(context) = context {
                result = result.with_effect(Effect::ReplaceContext { context });
            }

            Ok(result
                .with_effect(Effect::append_bot_message(text))
                .with_effect(Effect::SetBusy { busy: false })
                .with_effect(Effect::NotifyTurnDone { success: true }))
        }

        // AwaitingReply + ReplyFailed -> Idle, context untouched
        (TurnState::AwaitingReply, Event::ReplyFailed { error }) => {
            let text = error
                .user_message
                .unwrap_or_else(|| GENERIC_FALLBACK.to_string());

            Ok(TransitionResult::new(TurnState::Idle)
                .with_effect(Effect::append_bot_message(text))
                .with_effect(Effect::SetBusy { busy: false })
                .with_effect(Effect::NotifyTurnDone { success: false }))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
