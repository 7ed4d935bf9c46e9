//! Property-based tests for the turn state machine
//!
//! Effects are replayed against an in-memory session so invariants can be
//! checked on the resulting state, not only on the effect list.

use super::transition::*;
use super::*;
use crate::context::ConversationContext;
use crate::session::{ConversationSession, Message, Sender, SessionSnapshot};
use crate::transport::{TransportError, TurnReply};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// ============================================================================
// Test Helpers
// ============================================================================

/// Apply effects the way the runtime does, minus the I/O.
///
/// The runtime publishes a snapshot before every effect that does not mutate
/// the session, so each of those points is checked for consistency. Returns
/// the message a `SendTurn` effect asked to send, if any.
fn apply(
    session: &mut ConversationSession,
    effects: Vec<Effect>,
    tick: &mut i64,
) -> Result<Option<String>, TestCaseError> {
    let mut sent = None;
    for effect in effects {
        if !effect.mutates_session() {
            assert_published_state_consistent(&session.snapshot())?;
        }
        match effect {
            Effect::AppendMessage { sender, text } => {
                *tick += 1;
                let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(*tick);
                session.append_message(Message::new(sender, text, at));
            }
            Effect::ReplaceContext { context } => session.replace_context(context),
            Effect::SetBusy { busy } => session.set_busy(busy),
            Effect::SendTurn { message } => sent = Some(message),
            Effect::ClearDraft | Effect::NotifyTurnDone { .. } => {}
        }
    }
    Ok(sent)
}

/// A user message with no reply yet only ever shows up while busy
fn assert_published_state_consistent(snapshot: &SessionSnapshot) -> Result<(), TestCaseError> {
    let awaiting_reply = snapshot
        .last_message()
        .is_some_and(|m| m.sender == Sender::User);
    prop_assert!(
        !awaiting_reply || snapshot.busy,
        "snapshot shows an unanswered user message while idle"
    );
    Ok(())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_blank_input() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,8}"
}

fn arb_text_input() -> impl Strategy<Value = String> {
    ("[ \t\n]{0,3}", "[a-zA-Z0-9?!.,*_#`-]{1,20}( [a-zA-Z0-9]{1,10}){0,3}", "[ \t\n]{0,3}")
        .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
}

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![arb_blank_input(), arb_text_input()]
}

fn arb_context() -> impl Strategy<Value = ConversationContext> {
    proptest::collection::btree_map("[a-z_]{1,10}", "[a-zA-Z0-9 ]{0,20}", 0..5).prop_map(|m| {
        ConversationContext::from(
            m.into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect::<serde_json::Map<_, _>>(),
        )
    })
}

fn arb_reply() -> impl Strategy<Value = TurnReply> {
    ("(?s).{0,60}", proptest::option::of(arb_context()))
        .prop_map(|(text, context)| TurnReply { text, context })
}

fn arb_error() -> impl Strategy<Value = TransportError> {
    (
        prop_oneof![
            Just(TransportError::network("Connection failed")),
            Just(TransportError::status(500, "HTTP 500")),
            Just(TransportError::status(404, "HTTP 404")),
            Just(TransportError::malformed("Missing `response` field")),
            Just(TransportError::unknown("Transport panicked")),
        ],
        proptest::option::of("[a-zA-Z .,!]{1,40}"),
    )
        .prop_map(|(error, user_message)| match user_message {
            Some(text) => error.with_user_message(text),
            None => error,
        })
}

/// Outcome of one transport call
#[derive(Debug, Clone)]
enum Outcome {
    Reply(TurnReply),
    Failure(TransportError),
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        arb_reply().prop_map(Outcome::Reply),
        arb_error().prop_map(Outcome::Failure),
    ]
}

impl Outcome {
    fn into_event(self) -> Event {
        match self {
            Outcome::Reply(reply) => Event::ReplyReceived { reply },
            Outcome::Failure(error) => Event::ReplyFailed { error },
        }
    }
}


// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn blank_input_never_starts_a_turn(input in arb_blank_input()) {
        let result = transition(&TurnState::Idle, Event::user_submit(input));
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
    }

    #[test]
    fn accepted_input_is_trimmed_everywhere(input in arb_text_input()) {
        let trimmed = input.trim().to_string();
        let result = transition(&TurnState::Idle, Event::user_submit(input)).unwrap();

        prop_assert_eq!(result.new_state, TurnState::AwaitingReply);
        prop_assert_eq!(result.effects, vec![
            Effect::append_user_message(trimmed.clone()),
            Effect::SetBusy { busy: true },
            Effect::ClearDraft,
            Effect::SendTurn { message: trimmed },
        ]);
    }

    #[test]
    fn busy_rejects_every_submission(input in arb_input()) {
        let result = transition(&TurnState::AwaitingReply, Event::user_submit(input));
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn resolution_always_ends_idle_with_busy_cleared_last(outcome in arb_outcome()) {
        let result = transition(&TurnState::AwaitingReply, outcome.into_event()).unwrap();

        prop_assert_eq!(&result.new_state, &TurnState::Idle);
        let last_mutation = result.effects.iter().rev().find(|e| e.mutates_session());
        prop_assert_eq!(last_mutation, Some(&Effect::SetBusy { busy: false }));

        let bot_messages = result.effects.iter()
            .filter(|e| matches!(e, Effect::AppendMessage { sender: Sender::Bot, .. }))
            .count();
        prop_assert_eq!(bot_messages, 1);
        let sends_again = result.effects.iter().any(|e| matches!(e, Effect::SendTurn { .. }));
        prop_assert!(!sends_again);
    }

    #[test]
    fn reply_text_and_context_pass_through(reply in arb_reply()) {
        let expected = reply.clone();
        let result = transition(&TurnState::AwaitingReply, Event::ReplyReceived { reply }).unwrap();

        prop_assert!(result.effects.contains(&Effect::append_bot_message(expected.text)));
        let replaced = result.effects.iter().find_map(|e| match e {
            Effect::ReplaceContext { context } => Some(context.clone()),
            _ => None,
        });
        prop_assert_eq!(replaced, expected.context);
    }

    #[test]
    fn failure_never_touches_context(error in arb_error()) {
        let expected_text = error
            .user_message
            .clone()
            .unwrap_or_else(|| GENERIC_FALLBACK.to_string());
        let result = transition(&TurnState::AwaitingReply, Event::ReplyFailed { error }).unwrap();

        let touches_context = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ReplaceContext { .. }));
        prop_assert!(!touches_context);
        prop_assert_eq!(&result.effects[0], &Effect::append_bot_message(expected_text));
    }

    #[test]
    fn stray_outcomes_while_idle_are_invalid(outcome in arb_outcome()) {
        let result = transition(&TurnState::Idle, outcome.into_event());
        prop_assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    /// Drive whole conversations: each step is a submission, optionally a
    /// second submission while the first is pending, then the outcome.
    #[test]
    fn log_grows_by_two_per_accepted_turn(
        steps in proptest::collection::vec(
            (arb_input(), proptest::option::of(arb_input()), arb_outcome()),
            0..12,
        )
    ) {
        let mut session = ConversationSession::with_greeting(
            "hello",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );
        let mut state = TurnState::Idle;
        let mut tick = 0;
        let mut accepted = 0usize;

        for (input, interloper, outcome) in steps {
            let before = session.snapshot();
            let Ok(result) = transition(&state, Event::user_submit(input.clone())) else {
                prop_assert!(input.trim().is_empty());
                prop_assert_eq!(session.snapshot(), before);
                continue;
            };
            state = result.new_state;
            let sent = apply(&mut session, result.effects, &mut tick)?;
            prop_assert_eq!(sent.as_deref(), Some(input.trim()));
            prop_assert_eq!(&state, &TurnState::AwaitingReply);
            prop_assert!(session.snapshot().busy);

            if let Some(extra) = interloper {
                let pending = session.snapshot();
                prop_assert_eq!(
                    transition(&state, Event::user_submit(extra)).unwrap_err(),
                    TransitionError::Busy
                );
                prop_assert_eq!(session.snapshot(), pending);
            }

            let context_before = session.context().clone();
            let expected_context = match &outcome {
                Outcome::Reply(reply) => reply.context.clone().unwrap_or(context_before),
                Outcome::Failure(_) => context_before,
            };

            let result = transition(&state, outcome.into_event()).unwrap();
            state = result.new_state;
            prop_assert!(apply(&mut session, result.effects, &mut tick)?.is_none());
            accepted += 1;

            prop_assert_eq!(&state, &TurnState::Idle);
            prop_assert!(!session.snapshot().busy);
            prop_assert_eq!(session.context(), &expected_context);
        }

        let messages = session.messages();
        prop_assert_eq!(messages.len(), 1 + 2 * accepted);
        for pair in messages[1..].chunks(2) {
            prop_assert_eq!(pair[0].sender, Sender::User);
            prop_assert_eq!(pair[1].sender, Sender::Bot);
        }
        prop_assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
