//! Effects produced by state transitions
//!
//! The transition function performs no I/O; it describes what should
//! happen and the flow runtime executes it.

/// Effects to be executed after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stage a collected field in the user's session.
    PutField { key: &'static str, value: String },

    /// Drop the user's session record entirely.
    ResetSession,

    /// Deliver one outbound prompt to the user.
    SendPrompt { text: String },

    /// Hand the staged fields to the commit collaborator. The runtime
    /// resets the session on success and keeps it parked on failure.
    Commit,
}

impl Effect {
    pub fn put_field(key: &'static str, value: impl Into<String>) -> Self {
        Effect::PutField {
            key,
            value: value.into(),
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Effect::SendPrompt { text: text.into() }
    }
}
