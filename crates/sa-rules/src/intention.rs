//! Intentions — the next action an agent announces to its partners.

use sa_core::{AgentId, Turn};

use crate::Action;

/// An announced future action.
///
/// Created once per reevaluation tick per agent, when an RS rule is picked as
/// the agent's intended action, and broadcast to every communication partner.
/// Immutable once created: fields are only readable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intention {
    agent:  AgentId,
    action: Action,
    turn:   Turn,
    time:   f64,
}

impl Intention {
    pub fn new(agent: AgentId, action: Action, turn: Turn, time: f64) -> Self {
        Self { agent, action, turn, time }
    }

    /// The announcing agent.
    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Decision round the intention belongs to; the key it is stored under.
    #[inline]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Simulated time of the announcement.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Seconds elapsed between the announcement and `now`.
    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.time
    }
}
