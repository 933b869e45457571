//! Intake flow states and field names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field keys collected by the intake flow.
pub mod field {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const STARTS_AT: &str = "starts_at";
    pub const ENDS_AT: &str = "ends_at";
}

/// Staged timestamps use this pattern until commit parses them back.
pub const STAGED_STAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Where a user currently is in the hike-creation flow.
///
/// `Idle` is both the initial and the terminal state; a user with no
/// session record is Idle by definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    CollectingTitle,
    CollectingDescription,
    CollectingDates,
    Confirming,
}

impl FlowState {
    /// True for every state except `Idle`.
    pub fn is_active(self) -> bool {
        !matches!(self, FlowState::Idle)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Idle => "idle",
            FlowState::CollectingTitle => "collecting_title",
            FlowState::CollectingDescription => "collecting_description",
            FlowState::CollectingDates => "collecting_dates",
            FlowState::Confirming => "confirming",
        };
        f.write_str(name)
    }
}
