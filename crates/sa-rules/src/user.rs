//! User-defined rules: hand-coded safety transforms checked before any
//! learned rule.

use crate::{RuleError, RuleResult};

pub const MAX_GREEN_PHASE_TIME_REACHED: &str = "maxGreenPhaseTimeReached";
pub const MAX_YELLOW_PHASE_TIME_REACHED: &str = "maxYellowPhaseTimeReached";
pub const EMERGENCY_VEHICLE_APPROACHING: &str = "emergencyVehicleApproaching";

/// The phase transform applied when a user rule fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserAction {
    /// Move from the current green phase to its yellow counterpart.
    SwitchToYellow,
    /// Move to the next phase of the program, wrapping to phase 0 after the
    /// last green phase.
    AdvancePhase,
}

/// A rule written by hand rather than learned.  User rules carry no weight
/// and are never touched by credit assignment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRule {
    pub conditions: Vec<String>,
    pub action:     UserAction,
}

impl UserRule {
    pub fn new<S: Into<String>>(
        conditions: impl IntoIterator<Item = S>,
        action:     UserAction,
    ) -> RuleResult<Self> {
        let conditions: Vec<String> = conditions.into_iter().map(Into::into).collect();
        if conditions.is_empty() {
            return Err(RuleError::EmptyUserRule);
        }
        Ok(Self { conditions, action })
    }

    /// Force yellow once a green phase has run for `max_green_phase_time`.
    pub fn max_green_phase_time_reached() -> Self {
        Self {
            conditions: vec![MAX_GREEN_PHASE_TIME_REACHED.to_owned()],
            action:     UserAction::SwitchToYellow,
        }
    }

    /// Advance once a yellow phase has run for `max_yellow_phase_time`.
    pub fn max_yellow_phase_time_reached() -> Self {
        Self {
            conditions: vec![MAX_YELLOW_PHASE_TIME_REACHED.to_owned()],
            action:     UserAction::AdvancePhase,
        }
    }

    /// The two timing rules, in the order they are checked.
    pub fn standard_set() -> Vec<UserRule> {
        vec![
            Self::max_green_phase_time_reached(),
            Self::max_yellow_phase_time_reached(),
        ]
    }

    /// Conditions that take part in the applicability scan.
    ///
    /// Emergency-vehicle conditions are handled outside the scan and are
    /// always skipped here.
    pub fn scanned_conditions(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .map(String::as_str)
            .filter(|c| !c.contains(EMERGENCY_VEHICLE_APPROACHING))
    }
}
