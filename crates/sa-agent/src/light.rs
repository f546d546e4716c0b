//! The traffic light agent.

use std::collections::BTreeMap;

use tracing::trace;

use sa_core::{AgentId, IntentionRetention, Turn};
use sa_rules::{Intention, RuleRef};

use crate::{AgentError, AgentResult, IntentionInbox};

/// Vehicle id → accumulated waiting time, for the vehicles stopped at an
/// intersection at one instant.
pub type WaitSnapshot = BTreeMap<String, f64>;

// ── Phase ─────────────────────────────────────────────────────────────────────

/// One entry of a light's phase program.
///
/// Names follow `<approach>_<movement>_<G|Y>`, e.g. `NS_S_G`; the third part
/// tells green phases from their yellow (transitional) counterparts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phase {
    pub name: String,
}

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `G`, `Y`, or `""` when the name has fewer than three parts.
    pub fn state(&self) -> &str {
        self.name.split('_').nth(2).unwrap_or("")
    }

    /// Name of the yellow phase that follows this green one.
    pub fn yellow_counterpart(&self) -> Option<String> {
        if self.state() != "G" {
            return None;
        }
        let mut parts: Vec<&str> = self.name.split('_').collect();
        parts[2] = "Y";
        Some(parts.join("_"))
    }
}

// ── AppliedRule ───────────────────────────────────────────────────────────────

/// What the agent applied at its last decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AppliedRule {
    /// No decision yet this run.
    #[default]
    Unset,
    /// A user-defined rule, by position in the user rule list.
    User(usize),
    /// A rule from the assigned individual's RS or RSint catalog.
    Learned(RuleRef),
    /// No rule applied; the explicit do-nothing outcome.
    DoNothing,
}

impl AppliedRule {
    #[inline]
    pub fn learned(self) -> Option<RuleRef> {
        match self {
            AppliedRule::Learned(r) => Some(r),
            _ => None,
        }
    }

    #[inline]
    pub fn is_user(self) -> bool {
        matches!(self, AppliedRule::User(_))
    }
}

// ── TrafficLight ──────────────────────────────────────────────────────────────

/// A controlled intersection.
///
/// Holds simulator-facing state (lanes, derived edges, phase program), the
/// bookkeeping of the decision loop (applied rule, last waiting snapshot,
/// do-nothing counter), and both intention tables.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    id:       AgentId,
    name:     String,
    lanes:    Vec<String>,
    edges:    Vec<String>,
    phases:   Vec<Phase>,
    partners: Vec<AgentId>,

    applied:          AppliedRule,
    cars_waiting:     WaitSnapshot,
    wait_time:        f64,
    do_nothing_count: u64,

    communicated: BTreeMap<Turn, Intention>,
    received:     IntentionInbox,
}

impl TrafficLight {
    pub fn new(
        id:        AgentId,
        name:      impl Into<String>,
        lanes:     Vec<String>,
        phases:    Vec<Phase>,
        retention: IntentionRetention,
    ) -> Self {
        let edges = derive_edges(&lanes);
        Self {
            id,
            name: name.into(),
            lanes,
            edges,
            phases,
            partners:         Vec::new(),
            applied:          AppliedRule::Unset,
            cars_waiting:     WaitSnapshot::new(),
            wait_time:        0.0,
            do_nothing_count: 0,
            communicated:     BTreeMap::new(),
            received:         IntentionInbox::new(retention),
        }
    }

    // ── Identity and topology ─────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lanes(&self) -> &[String] {
        &self.lanes
    }

    pub fn controls_lane(&self, lane: &str) -> bool {
        self.lanes.iter().any(|l| l == lane)
    }

    /// Edges of the controlled lanes, de-duplicated, with left-turn-lane
    /// edges (`<edge>_LTL`) kept apart from through edges.
    pub fn edges(&self) -> &[String] {
        &self.edges
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn add_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    pub fn partners(&self) -> &[AgentId] {
        &self.partners
    }

    pub fn is_partner(&self, other: AgentId) -> bool {
        self.partners.contains(&other)
    }

    pub(crate) fn add_partner(&mut self, other: AgentId) {
        if !self.partners.contains(&other) {
            self.partners.push(other);
        }
    }

    // ── Decision bookkeeping ──────────────────────────────────────────────

    #[inline]
    pub fn current_rule(&self) -> AppliedRule {
        self.applied
    }

    pub fn set_current_rule(&mut self, rule: AppliedRule) {
        self.applied = rule;
    }

    /// Vehicles stopped at the intersection at the last reevaluation.
    pub fn cars_waiting(&self) -> &WaitSnapshot {
        &self.cars_waiting
    }

    /// Replace the stored snapshot, returning the previous one.
    pub fn update_cars_waiting(&mut self, snapshot: WaitSnapshot) -> WaitSnapshot {
        std::mem::replace(&mut self.cars_waiting, snapshot)
    }

    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    pub fn set_wait_time(&mut self, wait_time: f64) {
        self.wait_time = wait_time;
    }

    /// Count one application of the do-nothing outcome.
    pub fn do_nothing(&mut self) {
        self.do_nothing_count += 1;
    }

    pub fn do_nothing_count(&self) -> u64 {
        self.do_nothing_count
    }

    // ── Intentions ────────────────────────────────────────────────────────

    /// Outbound table: the latest intention announced per turn.
    pub fn communicated_intentions(&self) -> &BTreeMap<Turn, Intention> {
        &self.communicated
    }

    pub(crate) fn record_outbound(&mut self, intention: Intention) {
        self.communicated.insert(intention.turn(), intention);
    }

    pub fn received_intentions(&self) -> &IntentionInbox {
        &self.received
    }

    /// Store an intention delivered by a partner.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotAPartner`] if the announcing agent is not one of
    /// this light's communication partners.
    pub fn receive(&mut self, intention: Intention) -> AgentResult<()> {
        if !self.is_partner(intention.agent()) {
            return Err(AgentError::NotAPartner { from: intention.agent(), to: self.id });
        }
        trace!(to = %self.name, from = %intention.agent(), turn = %intention.turn(), "intention received");
        self.received.push(intention);
        Ok(())
    }

    /// Clear all per-run state: applied rule, snapshots, counters, and both
    /// intention tables.
    pub fn reset_for_run(&mut self) {
        self.applied = AppliedRule::Unset;
        self.cars_waiting.clear();
        self.wait_time = 0.0;
        self.do_nothing_count = 0;
        self.communicated.clear();
        self.received.clear();
    }

    pub(crate) fn set_retention(&mut self, retention: IntentionRetention) {
        self.received.set_retention(retention);
    }
}

/// `true` for lanes tagged as a left-turn lane (`<edge>_LTL_<n>`).
pub fn is_left_turn_lane(lane: &str) -> bool {
    lane.contains("_LTL")
}

/// Edge a lane belongs to: `A_0` → `A`, `A_LTL_0` → `A_LTL`.
pub fn edge_of(lane: &str) -> String {
    let mut parts = lane.split('_');
    let base = parts.next().unwrap_or(lane);
    if parts.next() == Some("LTL") {
        format!("{base}_LTL")
    } else {
        base.to_owned()
    }
}

fn derive_edges(lanes: &[String]) -> Vec<String> {
    let mut edges: Vec<String> = Vec::new();
    for lane in lanes {
        let edge = edge_of(lane);
        if edges.contains(&edge) {
            trace!(%lane, %edge, "edge already listed");
        } else {
            edges.push(edge);
        }
    }
    edges
}
