//! Records emitted by the engine while it runs.

use std::fmt;

use sa_core::{AgentId, RuleId, Tick, Turn};

/// Where a resolved decision came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionSource {
    User,
    /// The RS rule announced as the intention.
    Individual,
    /// An RSint rule that outweighed or won the tie-break against the RS rule.
    Cooperative,
    /// No applicable RS rule.
    DoNothing,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecisionSource::User => "user",
            DecisionSource::Individual => "rs",
            DecisionSource::Cooperative => "rsint",
            DecisionSource::DoNothing => "do_nothing",
        })
    }
}

/// One resolved decision.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionRecord {
    pub tick:   Tick,
    pub time:   f64,
    pub turn:   Turn,
    pub agent:  AgentId,
    pub source: DecisionSource,
    /// The learned rule applied, if any.
    pub rule:   Option<RuleId>,
    /// Phase commanded to the simulator; `None` when no command was issued.
    pub phase:  Option<u32>,
    /// `true` when the pCoop draw decided between RS and RSint.
    pub tie_break: bool,
}

/// One reinforcement update of an outgoing rule.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightUpdateRecord {
    pub time:       f64,
    pub agent:      AgentId,
    pub rule:       RuleId,
    pub old_weight: f64,
    pub new_weight: f64,
    pub throughput: usize,
}

/// Decisions of one run, by source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionCounts {
    pub user:        u64,
    pub individual:  u64,
    pub cooperative: u64,
    pub do_nothing:  u64,
}

impl DecisionCounts {
    pub fn record(&mut self, source: DecisionSource) {
        match source {
            DecisionSource::User => self.user += 1,
            DecisionSource::Individual => self.individual += 1,
            DecisionSource::Cooperative => self.cooperative += 1,
            DecisionSource::DoNothing => self.do_nothing += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.user + self.individual + self.cooperative + self.do_nothing
    }
}

/// Summary returned by [`DecisionEngine::run`](crate::DecisionEngine::run).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Zero-based run counter of the engine.
    pub run:            u64,
    /// Simulated time at which the run ended.
    pub run_time:       f64,
    pub steps:          u64,
    pub reevaluations:  u64,
    pub decisions:      DecisionCounts,
    pub weight_updates: u64,
    /// Do-nothing count per agent, in `AgentId` order.
    pub do_nothing:     Vec<(AgentId, u64)>,
}
