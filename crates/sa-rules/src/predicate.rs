//! Predicate parameters and the identifier → predicate registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sa_core::AgentId;

use crate::library::{self, Comparison};
use crate::user::{
    EMERGENCY_VEHICLE_APPROACHING, MAX_GREEN_PHASE_TIME_REACHED, MAX_YELLOW_PHASE_TIME_REACHED,
};
use crate::{Action, PredicateFamily, Rule, RuleError, RuleKind, RuleResult, UserRule};

// ── Parameters ────────────────────────────────────────────────────────────────

/// Values extracted from simulator and agent state for one condition.
///
/// The variant is fixed by the condition's [`PredicateFamily`].
#[derive(Clone, Debug, PartialEq)]
pub enum PredicateParams {
    /// Wait times, vehicle counts, phase age, time since an announcement.
    Scalar(f64),
    /// The current phase name split on `_` (`*PhaseIs` families).
    PhaseName(Vec<String>),
    /// Phase timing for the max-green / max-yellow checks.
    PhaseTimer {
        /// `G` or `Y`, the third `_`-separated part of the phase name.
        state:   String,
        /// Seconds the current phase has been running.
        elapsed: f64,
        /// Configured maximum for this phase state.
        limit:   f64,
    },
    /// The action declared by a received intention.
    IntendedAction(Action),
    /// `<peer name>_<action>` of a received intention.
    PeerIntent {
        key:    String,
        agent:  AgentId,
        action: Action,
    },
    /// Families that need no parameters.
    None,
}

/// A typed predicate reference.
pub type PredicateFn = Arc<dyn Fn(&PredicateParams) -> bool + Send + Sync>;

// ── Registry ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct PredicateEntry {
    family: PredicateFamily,
    func:   PredicateFn,
}

/// Maps every condition identifier a catalog may use to its family and
/// predicate function.
///
/// Populate at startup, then call [`validate_rule`][Self::validate_rule] on
/// every catalog before the first tick.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    entries: HashMap<String, PredicateEntry>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("PredicateRegistry").field("ids", &ids).finish()
    }
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the user-rule predicates:
    /// `maxGreenPhaseTimeReached`, `maxYellowPhaseTimeReached`, and
    /// `emergencyVehicleApproaching` (never true; emergencies are handled
    /// outside the rule scan).
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert(
            MAX_GREEN_PHASE_TIME_REACHED,
            PredicateFamily::MaxGreenPhaseTimeReached,
            library::phase_time_reached("G"),
        );
        registry.insert(
            MAX_YELLOW_PHASE_TIME_REACHED,
            PredicateFamily::MaxYellowPhaseTimeReached,
            library::phase_time_reached("Y"),
        );
        registry.insert(
            EMERGENCY_VEHICLE_APPROACHING,
            PredicateFamily::EmergencyVehicleApproaching,
            Arc::new(|_| false),
        );
        registry
    }

    fn insert(&mut self, id: &str, family: PredicateFamily, func: PredicateFn) {
        self.entries.insert(id.to_owned(), PredicateEntry { family, func });
    }

    /// Register `func` under `id` with an explicit family.
    pub fn register(
        &mut self,
        id:     impl Into<String>,
        family: PredicateFamily,
        func:   PredicateFn,
    ) -> RuleResult<()> {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return Err(RuleError::DuplicatePredicate(id));
        }
        self.entries.insert(id, PredicateEntry { family, func });
        Ok(())
    }

    /// Register `func` under `id`, deriving the family from the identifier
    /// prefix.
    pub fn register_named(&mut self, id: impl Into<String>, func: PredicateFn) -> RuleResult<()> {
        let id = id.into();
        let family = PredicateFamily::from_identifier(&id)
            .ok_or_else(|| RuleError::UnknownPredicate(id.clone()))?;
        self.register(id, family, func)
    }

    /// `<family>_...` holds when the scalar parameter compares true
    /// against `value`.
    pub fn register_threshold(
        &mut self,
        id:    impl Into<String>,
        cmp:   Comparison,
        value: f64,
    ) -> RuleResult<()> {
        self.register_named(id, library::threshold(cmp, value))
    }

    /// `<axis>PhaseIs_...` holds when the current phase name contains `part`
    /// as one of its `_`-separated components.
    pub fn register_phase_is(
        &mut self,
        id:   impl Into<String>,
        part: impl Into<String>,
    ) -> RuleResult<()> {
        self.register_named(id, library::phase_is(part.into()))
    }

    /// `intendedActionIs_...` holds when the intention declares `action`.
    pub fn register_intended_action(
        &mut self,
        id:     impl Into<String>,
        action: Action,
    ) -> RuleResult<()> {
        self.register_named(id, library::intended_action_is(action))
    }

    /// Register the peer-intent condition `<peer>_<action>`; it holds for an
    /// intention whose announcing agent is named `peer` and whose action is
    /// `action`.  Returns the identifier rules must use.
    pub fn register_peer_intent(&mut self, peer: &str, action: Action) -> RuleResult<String> {
        let id = format!("{peer}_{action}");
        self.register(id.clone(), PredicateFamily::PeerIntent, library::peer_intends(id.clone()))?;
        Ok(id)
    }

    /// Family of a registered identifier.
    pub fn family(&self, id: &str) -> RuleResult<PredicateFamily> {
        self.entries
            .get(id)
            .map(|e| e.family)
            .ok_or_else(|| RuleError::UnknownPredicate(id.to_owned()))
    }

    /// Evaluate the predicate registered under `id`.
    pub fn evaluate(&self, id: &str, params: &PredicateParams) -> RuleResult<bool> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| RuleError::UnknownPredicate(id.to_owned()))?;
        Ok((entry.func)(params))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every condition of `rule` is registered and belongs to a
    /// family its kind can evaluate.
    pub fn validate_rule(&self, rule: &Rule) -> RuleResult<()> {
        for cond in &rule.conditions {
            let family = self.family(cond)?;
            let coop = rule.kind == RuleKind::Cooperative;
            if family.is_cooperative() != coop {
                return Err(RuleError::FamilyMismatch {
                    id: cond.clone(),
                    family,
                    kind: rule.kind,
                });
            }
        }
        Ok(())
    }

    /// Check that every scanned condition of a user rule is registered.
    pub fn validate_user_rule(&self, rule: &UserRule) -> RuleResult<()> {
        for cond in rule.scanned_conditions() {
            let family = self.family(cond)?;
            if family.is_cooperative() {
                return Err(RuleError::FamilyMismatch {
                    id:   cond.to_owned(),
                    family,
                    kind: RuleKind::Individual,
                });
            }
        }
        Ok(())
    }
}
