//! Predicate families.
//!
//! A condition identifier looks like `<family>_<rest>`, e.g.
//! `numCarsWaitingToTurnLeft_gt_3`.  The family (text before the first `_`)
//! decides which parameters the engine extracts from simulator state; the
//! full identifier selects the predicate function.

/// Compass axis named by a `*PhaseIs` family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseAxis {
    Vertical,
    Horizontal,
    NorthSouth,
    SouthNorth,
    EastWest,
    WestEast,
}

/// The parameter shape a condition needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PredicateFamily {
    // ── Single-agent ──────────────────────────────────────────────────────
    LongestTimeWaitedToProceedStraight,
    LongestTimeWaitedToTurnLeft,
    NumCarsWaitingToProceedStraight,
    NumCarsWaitingToTurnLeft,
    TimeSpentInCurrentPhase,
    PhaseIs(PhaseAxis),
    MaxGreenPhaseTimeReached,
    MaxYellowPhaseTimeReached,
    EmergencyVehicleApproaching,

    // ── Cooperative ───────────────────────────────────────────────────────
    TimeSinceCommunication,
    IntendedActionIs,
    /// `<peer>_<action>`: does a specific partner intend a specific action.
    PeerIntent,
}

impl PredicateFamily {
    /// Resolve the family named by an identifier's prefix.
    ///
    /// Returns `None` for prefixes that name no built-in family; cooperative
    /// peer-intent identifiers (`<peer>_<action>`) are one such case and are
    /// registered with an explicit [`PredicateFamily::PeerIntent`].
    pub fn from_identifier(id: &str) -> Option<Self> {
        let prefix = id.split('_').next().unwrap_or(id);
        let family = match prefix {
            "longestTimeWaitedToProceedStraight" => Self::LongestTimeWaitedToProceedStraight,
            "longestTimeWaitedToTurnLeft"        => Self::LongestTimeWaitedToTurnLeft,
            "numCarsWaitingToProceedStraight"    => Self::NumCarsWaitingToProceedStraight,
            "numCarsWaitingToTurnLeft"           => Self::NumCarsWaitingToTurnLeft,
            "timeSpentInCurrentPhase"            => Self::TimeSpentInCurrentPhase,
            "verticalPhaseIs"                    => Self::PhaseIs(PhaseAxis::Vertical),
            "horizontalPhaseIs"                  => Self::PhaseIs(PhaseAxis::Horizontal),
            "northSouthPhaseIs"                  => Self::PhaseIs(PhaseAxis::NorthSouth),
            "southNorthPhaseIs"                  => Self::PhaseIs(PhaseAxis::SouthNorth),
            "eastWestPhaseIs"                    => Self::PhaseIs(PhaseAxis::EastWest),
            "westEastPhaseIs"                    => Self::PhaseIs(PhaseAxis::WestEast),
            "maxGreenPhaseTimeReached"           => Self::MaxGreenPhaseTimeReached,
            "maxYellowPhaseTimeReached"          => Self::MaxYellowPhaseTimeReached,
            "emergencyVehicleApproaching"        => Self::EmergencyVehicleApproaching,
            "timeSinceCommunication"             => Self::TimeSinceCommunication,
            "intendedActionIs"                   => Self::IntendedActionIs,
            _ => return None,
        };
        Some(family)
    }

    /// `true` for families whose parameters come from a received intention.
    #[inline]
    pub fn is_cooperative(self) -> bool {
        matches!(
            self,
            Self::TimeSinceCommunication | Self::IntendedActionIs | Self::PeerIntent
        )
    }
}
