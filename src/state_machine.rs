//! Turn state machine
//!
//! Elm-style pure transitions: the runtime feeds events in and executes the
//! effects that come out. No I/O happens here.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::TurnState;
pub use transition::{transition, TransitionError, TransitionResult, GENERIC_FALLBACK};
