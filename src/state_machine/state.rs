//! Turn controller state

/// Where the controller is within a turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Ready for user input, no request in flight
    #[default]
    Idle,

    /// A request has been sent and not yet resolved
    AwaitingReply,
}
