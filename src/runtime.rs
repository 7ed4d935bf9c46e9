//! Runtime for a single conversation
//!
//! Wires the executor to its channels: an `mpsc` inbox for submissions, a
//! `watch` channel carrying the latest session snapshot and a `broadcast`
//! channel for one-off notifications.

mod executor;
pub mod traits;


pub use executor::ConversationRuntime;
pub use traits::*;

use crate::session::{ConversationSession, SessionSnapshot};
use crate::state_machine::Event;
use crate::transport::AssistantTransport;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Notifications sent to renderers alongside snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A submission was accepted; the renderer should empty its input box
    DraftCleared,
    /// The in-flight turn resolved and the session is idle again
    TurnDone { success: bool },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Conversation runtime has stopped")]
    Stopped,
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl ConversationHandle {
    /// Hand the renderer's draft to the controller.
    ///
    /// Returns once the submission is queued. Blank drafts and drafts sent
    /// while a turn is in flight are dropped without any signal.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Stopped`] if the runtime task has exited.
    pub async fn submit_turn(&self, raw_input: impl Into<String>) -> Result<(), RuntimeError> {
        self.event_tx
            .send(Event::user_submit(raw_input))
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Start a runtime for `session` on the current tokio runtime.
///
/// The task ends once every handle is dropped and any pending turn has
/// resolved.
pub fn spawn_conversation<T, C>(
    session: ConversationSession,
    transport: T,
    clock: C,
) -> (ConversationHandle, JoinHandle<()>)
where
    T: AssistantTransport + 'static,
    C: Clock + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    let runtime = ConversationRuntime::new(
        session,
        transport,
        clock,
        event_rx,
        broadcast_tx.clone(),
        snapshot_tx,
    );
    let task = tokio::spawn(runtime.run());

    let handle = ConversationHandle {
        event_tx,
        broadcast_tx,
        snapshot_rx,
    };
    (handle, task)
}
