//! Pure state transition function for the intake flow
//!
//! Given the current state, a snapshot of the collected fields, and one
//! event, `transition` yields the next state plus the effects to run.
//! Given the same inputs it always produces the same outputs, with no
//! I/O side effects; every processed event yields exactly one outbound
//! prompt or one commit request.

use super::state::{field, FlowState, STAGED_STAMP_FORMAT};
use super::{Effect, FlowEvent};
use crate::dates::{resolve, ParsedRange};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

const DATE_EXAMPLES: &str = "10 · 10 12 · 10-12 · 31 3 · 03.02-04.02 · 15.12 16.12";

/// Fixed inputs for a transition: who and when.
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub user_id: i64,
    /// Injected reference instant; its offset is the resolution timezone.
    pub now: DateTime<FixedOffset>,
}

impl FlowContext {
    pub fn new(user_id: i64, now: DateTime<FixedOffset>) -> Self {
        Self { user_id, now }
    }
}

/// Result of a state transition.
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: FlowState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: FlowState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function.
///
/// Total over every (state, event) pair: inputs outside the flow table
/// fall through to a defensive reset instead of an error, so a confused
/// session always stays usable.
pub fn transition(
    state: FlowState,
    fields: &HashMap<String, String>,
    ctx: &FlowContext,
    event: FlowEvent,
) -> TransitionResult {
    match (state, event) {
        // Explicit abandon works from anywhere, including Idle.
        (_, FlowEvent::Cancel) => TransitionResult::new(FlowState::Idle)
            .with_effect(Effect::ResetSession)
            .with_effect(Effect::prompt(
                "Hike creation cancelled. Send /newhike to start again.",
            )),

        // The creation command restarts the flow even mid-way, dropping
        // anything collected so far.
        (_, FlowEvent::Begin) => TransitionResult::new(FlowState::CollectingTitle)
            .with_effect(Effect::ResetSession)
            .with_effect(Effect::prompt(
                "Creating a new hike.\n\nEnter the title:",
            )),

        (FlowState::CollectingTitle, FlowEvent::Text(text)) => {
            TransitionResult::new(FlowState::CollectingDescription)
                .with_effect(Effect::put_field(field::TITLE, text))
                .with_effect(Effect::prompt("Enter the description:"))
        }

        (FlowState::CollectingDescription, FlowEvent::Text(text)) => {
            TransitionResult::new(FlowState::CollectingDates)
                .with_effect(Effect::put_field(field::DESCRIPTION, text))
                .with_effect(Effect::prompt(format!(
                    "Enter the start and end dates (examples: {DATE_EXAMPLES})."
                )))
        }

        (FlowState::CollectingDates, FlowEvent::Text(text)) => {
            match resolve(&text, ctx.now) {
                Ok(range) => {
                    let preview = build_preview(fields, &range);
                    TransitionResult::new(FlowState::Confirming)
                        .with_effect(Effect::put_field(
                            field::STARTS_AT,
                            range.start.format(STAGED_STAMP_FORMAT).to_string(),
                        ))
                        .with_effect(Effect::put_field(
                            field::ENDS_AT,
                            range.end.format(STAGED_STAMP_FORMAT).to_string(),
                        ))
                        .with_effect(Effect::prompt(preview))
                }
                // Recoverable input error: reprompt, stay put.
                Err(err) => TransitionResult::new(FlowState::CollectingDates).with_effect(
                    Effect::prompt(format!(
                        "Could not make out the dates ({err}). Try again.\nExamples: {DATE_EXAMPLES}"
                    )),
                ),
            }
        }

        (FlowState::Confirming, FlowEvent::Text(text)) => {
            match text.trim().to_lowercase().as_str() {
                "cancel" => TransitionResult::new(FlowState::Idle)
                    .with_effect(Effect::ResetSession)
                    .with_effect(Effect::prompt(
                        "Hike creation cancelled. Send /newhike to start again.",
                    )),
                "ok" => {
                    // The runtime resolves the commit outcome: reset on
                    // success, stay parked here on failure.
                    TransitionResult::new(FlowState::Confirming).with_effect(Effect::Commit)
                }
                _ => TransitionResult::new(FlowState::Confirming).with_effect(Effect::prompt(
                    "Send 'ok' to save or 'cancel' to discard.",
                )),
            }
        }

        // Defensive reset: text arriving with no active flow (or any
        // state this table does not know) drops the session.
        (_, FlowEvent::Text(_)) => TransitionResult::new(FlowState::Idle)
            .with_effect(Effect::ResetSession)
            .with_effect(Effect::prompt(
                "Flow state reset. Send /newhike to start a new hike.",
            )),
    }
}

fn build_preview(fields: &HashMap<String, String>, range: &ParsedRange) -> String {
    let missing = String::new();
    let title = fields.get(field::TITLE).unwrap_or(&missing);
    let description = fields.get(field::DESCRIPTION).unwrap_or(&missing);
    format!(
        "Check the details:\n\nTitle: {}\nDescription: {}\nDates: {} \u{2192} {}\n\nSend 'ok' to save or 'cancel' to discard.",
        title,
        description,
        range.start.format("%d %b %Y %H:%M"),
        range.end.format("%d %b %Y %H:%M"),
    )
}
