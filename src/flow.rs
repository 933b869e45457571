//! Runtime for executing the intake flow
//!
//! The pure state machine lives in `crate::state_machine`; this module
//! supplies the collaborator trait seams, the production adapters, and
//! the executor that applies transition effects to the session store.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{FlowError, FlowRuntime};
pub use traits::*;

/// What one processed event amounted to, from the embedder's point of
/// view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The event produced a prompt back to the user.
    PromptSent,
    /// The event triggered a commit attempt; `ok` is its outcome. A
    /// failed commit leaves the session parked in `Confirming`.
    CommitAttempted { ok: bool },
}
