//! Flow runtime: wires the pure state machine to its collaborators

use super::traits::{Clock, CommitSink, PromptSink};
use super::FlowOutcome;
use crate::session::SessionStore;
use crate::state_machine::{transition, Effect, FlowContext, FlowEvent, FlowState};
use std::sync::Arc;
use thiserror::Error;

/// Errors the runtime surfaces to its caller. Commit failures are not
/// here: they park the session in `Confirming` and come back to the
/// caller as a failed `FlowOutcome::CommitAttempted`.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Prompt(#[from] super::traits::PromptError),
}

/// Drives one user's intake flow: reads the session, runs the pure
/// transition, executes the resulting effects.
///
/// Generic over the collaborator implementations so tests can run it
/// against mocks.
pub struct FlowRuntime<P, C, K>
where
    P: PromptSink + 'static,
    C: CommitSink + 'static,
    K: Clock + 'static,
{
    sessions: SessionStore,
    prompts: Arc<P>,
    commits: Arc<C>,
    clock: K,
}

impl<P, C, K> FlowRuntime<P, C, K>
where
    P: PromptSink + 'static,
    C: CommitSink + 'static,
    K: Clock + 'static,
{
    pub fn new(prompts: Arc<P>, commits: Arc<C>, clock: K) -> Self {
        Self {
            sessions: SessionStore::new(),
            prompts,
            commits,
            clock,
        }
    }

    /// Explicit entry point, equivalent to the creation command.
    pub async fn begin(&self, user_id: i64) -> Result<FlowOutcome, FlowError> {
        self.dispatch(user_id, FlowEvent::Begin).await
    }

    /// Explicit abandon; resets the user to Idle.
    pub async fn cancel(&self, user_id: i64) -> Result<FlowOutcome, FlowError> {
        self.dispatch(user_id, FlowEvent::Cancel).await
    }

    /// Process one free-text reply. Callers route only non-command text
    /// here.
    pub async fn handle_text(&self, user_id: i64, text: &str) -> Result<FlowOutcome, FlowError> {
        self.dispatch(user_id, FlowEvent::Text(text.to_string())).await
    }

    /// Current flow state, for display/status paths.
    pub fn state(&self, user_id: i64) -> FlowState {
        self.sessions.state(user_id)
    }

    async fn dispatch(&self, user_id: i64, event: FlowEvent) -> Result<FlowOutcome, FlowError> {
        let state = self.sessions.state(user_id);
        let fields = self.sessions.fields(user_id);
        let ctx = FlowContext::new(user_id, self.clock.now());

        let result = transition(state, &fields, &ctx, event);
        tracing::debug!(user_id = ctx.user_id, from = %state, to = %result.new_state, "flow transition");

        let mut outcome = FlowOutcome::PromptSent;
        let mut committed = false;

        for effect in result.effects {
            match effect {
                Effect::PutField { key, value } => {
                    self.sessions.put_field(user_id, key, &value);
                }
                Effect::ResetSession => {
                    self.sessions.reset(user_id);
                }
                Effect::SendPrompt { text } => {
                    self.prompts.send_prompt(user_id, &text).await?;
                }
                Effect::Commit => {
                    let staged = self.sessions.fields(user_id);
                    let tz = *ctx.now.offset();
                    match self.commits.commit(&staged, tz).await {
                        Ok(()) => {
                            committed = true;
                            outcome = FlowOutcome::CommitAttempted { ok: true };
                            // Drop the session before the success prompt:
                            // the hike is already persisted, so even a
                            // failed delivery must not leave a session a
                            // repeated "ok" could commit again.
                            self.sessions.reset(user_id);
                            self.prompts.send_prompt(user_id, "Hike created!").await?;
                        }
                        Err(e) => {
                            // No automatic retry: the session stays
                            // parked in Confirming.
                            tracing::warn!(user_id, error = %e, "commit failed");
                            outcome = FlowOutcome::CommitAttempted { ok: false };
                            self.prompts
                                .send_prompt(
                                    user_id,
                                    "Could not save the hike. Send 'ok' to try again or 'cancel' to discard.",
                                )
                                .await?;
                        }
                    }
                }
            }
        }

        // Idle is represented by the absence of a record, so moving
        // there (or finishing a commit) drops the session instead of
        // writing the state back.
        if committed || result.new_state == FlowState::Idle {
            self.sessions.reset(user_id);
        } else {
            self.sessions.set_state(user_id, result.new_state);
        }

        Ok(outcome)
    }
}
