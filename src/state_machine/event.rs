//! Events that drive the intake flow

/// One inbound occurrence for a single user.
///
/// Command routing happens upstream: a recognized command never reaches
/// the state machine as a `Text` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// The creation command: start (or restart) the flow.
    Begin,
    /// A free-text reply from the operator.
    Text(String),
    /// Explicit abandon.
    Cancel,
}
