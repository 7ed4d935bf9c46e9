//! Conversation runtime executor
//!
//! Owns the session and drives it through the pure state machine. The
//! transport call is the only suspension point; while it is pending the
//! inbox keeps being read so that extra submissions meet the busy guard
//! instead of queueing behind the turn.

use super::traits::Clock;
use super::SessionEvent;
use crate::session::{ConversationSession, Message, SessionSnapshot};
use crate::state_machine::{transition, Effect, Event, TurnState};
use crate::transport::{AssistantTransport, TransportError, TurnRequest};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Pending transport call, resolving to the event that ends the turn
type InFlight = BoxFuture<'static, Event>;

/// Generic conversation runtime that works with any transport and clock
pub struct ConversationRuntime<T, C>
where
    T: AssistantTransport + 'static,
    C: Clock,
{
    session: ConversationSession,
    state: TurnState,
    transport: Arc<T>,
    clock: C,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    in_flight: Option<InFlight>,
    /// Session changed since the last published snapshot
    dirty: bool,
}

impl<T, C> ConversationRuntime<T, C>
where
    T: AssistantTransport + 'static,
    C: Clock,
{
    pub fn new(
        mut session: ConversationSession,
        transport: T,
        clock: C,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        // Nothing can be in flight for a runtime that has not started
        session.set_busy(false);
        snapshot_tx.send_replace(session.snapshot());

        Self {
            session,
            state: TurnState::Idle,
            transport: Arc::new(transport),
            clock,
            event_rx,
            broadcast_tx,
            snapshot_tx,
            in_flight: None,
            dirty: false,
        }
    }

    /// Process events until every handle is gone and no turn is pending.
    pub async fn run(mut self) {
        tracing::info!(endpoint = %self.transport.endpoint(), "Starting conversation runtime");

        let mut inbox_open = true;
        loop {
            tokio::select! {
                // Queued submissions are judged against the current state
                // before a finished call can move it back to idle.
                biased;

                event = self.event_rx.recv(), if inbox_open => match event {
                    Some(event) => self.process_event(event),
                    None => inbox_open = false,
                },
                event = next_outcome(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.process_event(event);
                }
                else => break,
            }
        }

        tracing::info!(
            messages = self.session.messages().len(),
            "Conversation runtime stopped"
        );
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) if e.is_rejection() => {
                tracing::debug!(reason = %e, "Submission dropped");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring event");
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        self.publish();
    }

    fn execute_effect(&mut self, effect: Effect) {
        if effect.mutates_session() {
            self.dirty = true;
        } else {
            // Notifications and I/O observe the session as it stands
            self.publish();
        }

        match effect {
            Effect::AppendMessage { sender, text } => {
                let message = Message::new(sender, text, self.timestamp());
                tracing::debug!(
                    sender = ?message.sender,
                    len = message.text.len(),
                    "Appending message"
                );
                self.session.append_message(message);
            }
            Effect::ReplaceContext { context } => {
                tracing::debug!(keys = context.len(), "Replacing conversation context");
                self.session.replace_context(context);
            }
            Effect::SetBusy { busy } => self.session.set_busy(busy),
            Effect::ClearDraft => {
                let _ = self.broadcast_tx.send(SessionEvent::DraftCleared);
            }
            Effect::SendTurn { message } => self.start_turn(message),
            Effect::NotifyTurnDone { success } => {
                let _ = self.broadcast_tx.send(SessionEvent::TurnDone { success });
            }
        }
    }

    fn start_turn(&mut self, message: String) {
        let request = TurnRequest::new(message, self.session.context().clone());
        let transport = Arc::clone(&self.transport);
        tracing::info!(
            len = request.message.len(),
            context_keys = request.context.len(),
            "Sending turn"
        );

        let call = async move { transport.send_turn(&request).await };
        self.in_flight = Some(
            AssertUnwindSafe(call)
                .catch_unwind()
                .map(|outcome| match outcome {
                    Ok(Ok(reply)) => Event::ReplyReceived { reply },
                    Ok(Err(error)) => Event::ReplyFailed { error },
                    Err(panic) => Event::ReplyFailed {
                        error: TransportError::unknown(format!(
                            "Transport panicked: {}",
                            panic_message(panic.as_ref())
                        )),
                    },
                })
                .boxed(),
        );
    }

    /// Current time, never earlier than the last message in the log
    fn timestamp(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        match self.session.last_timestamp() {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    fn publish(&mut self) {
        if self.dirty {
            self.snapshot_tx.send_replace(self.session.snapshot());
            self.dirty = false;
        }
    }
}

async fn next_outcome(in_flight: &mut Option<InFlight>) -> Event {
    match in_flight {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
