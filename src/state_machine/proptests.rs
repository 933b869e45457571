//! Property-based tests for the intake state machine
//!
//! These verify key invariants hold across all possible inputs.

use super::state::FlowState;
use super::transition::{transition, FlowContext};
use super::{Effect, FlowEvent};
use chrono::{FixedOffset, TimeZone};
use proptest::prelude::*;
use std::collections::HashMap;

fn test_context() -> FlowContext {
    let tz = FixedOffset::east_opt(3 * 3600).unwrap();
    FlowContext::new(7, tz.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
}

fn arb_state() -> impl Strategy<Value = FlowState> {
    prop_oneof![
        Just(FlowState::Idle),
        Just(FlowState::CollectingTitle),
        Just(FlowState::CollectingDescription),
        Just(FlowState::CollectingDates),
        Just(FlowState::Confirming),
    ]
}

fn arb_event() -> impl Strategy<Value = FlowEvent> {
    prop_oneof![
        Just(FlowEvent::Begin),
        Just(FlowEvent::Cancel),
        ".{0,30}".prop_map(FlowEvent::Text),
    ]
}

proptest! {
    /// Every processed event produces exactly one outbound side effect:
    /// either a prompt or a commit request, never both, never neither.
    #[test]
    fn exactly_one_prompt_or_commit(state in arb_state(), event in arb_event()) {
        let result = transition(state, &HashMap::new(), &test_context(), event);
        let outbound = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::SendPrompt { .. } | Effect::Commit))
            .count();
        prop_assert_eq!(outbound, 1);
    }

    /// Cancel always lands in Idle and drops the session.
    #[test]
    fn cancel_always_resets(state in arb_state()) {
        let result = transition(state, &HashMap::new(), &test_context(), FlowEvent::Cancel);
        prop_assert_eq!(result.new_state, FlowState::Idle);
        prop_assert!(result.effects.contains(&Effect::ResetSession));
    }

    /// The creation command always restarts from the title step.
    #[test]
    fn begin_always_restarts(state in arb_state()) {
        let result = transition(state, &HashMap::new(), &test_context(), FlowEvent::Begin);
        prop_assert_eq!(result.new_state, FlowState::CollectingTitle);
        prop_assert!(result.effects.contains(&Effect::ResetSession));
    }

    /// Transitions are deterministic: the same inputs yield the same
    /// state and effects.
    #[test]
    fn transitions_are_deterministic(state in arb_state(), event in arb_event()) {
        let first = transition(state, &HashMap::new(), &test_context(), event.clone());
        let second = transition(state, &HashMap::new(), &test_context(), event);
        prop_assert_eq!(first.new_state, second.new_state);
        prop_assert_eq!(first.effects, second.effects);
    }

    /// Date entry either advances to Confirming or stays put; no text
    /// can send it anywhere else.
    #[test]
    fn date_entry_only_advances_or_holds(text in ".{0,30}") {
        let result = transition(
            FlowState::CollectingDates,
            &HashMap::new(),
            &test_context(),
            FlowEvent::Text(text),
        );
        prop_assert!(matches!(
            result.new_state,
            FlowState::CollectingDates | FlowState::Confirming
        ));
    }

    /// A session is only ever dropped together with a move to Idle or a
    /// flow restart.
    #[test]
    fn reset_only_on_idle_or_restart(state in arb_state(), event in arb_event()) {
        let result = transition(state, &HashMap::new(), &test_context(), event);
        if result.effects.contains(&Effect::ResetSession) {
            prop_assert!(matches!(
                result.new_state,
                FlowState::Idle | FlowState::CollectingTitle
            ));
        }
    }
}
