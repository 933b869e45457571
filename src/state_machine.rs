//! Per-user intake state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! events go in, a new state plus a list of effects comes out, and the
//! flow runtime executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::FlowEvent;
pub use state::FlowState;
pub use transition::{transition, FlowContext, TransitionResult};
