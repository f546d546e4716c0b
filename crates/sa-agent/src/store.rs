//! Agent storage: `AgentStore` (all traffic lights) and `AgentRngs`
//! (per-agent RNG).
//!
//! RNGs live apart from the lights so the engine can hold `&mut AgentRng`
//! for one agent while reading partner state through `&AgentStore`.

use tracing::debug;

use sa_core::{AgentId, AgentRng, IntentionRetention};
use sa_rules::Intention;

use crate::{AgentError, AgentResult, TrafficLight};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, indexed by `AgentId`.
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    /// Allocate and seed `count` per-agent RNGs from `global_seed`.
    pub fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Every traffic light of the network, indexed by `AgentId`.
///
/// Built by [`AgentStoreBuilder`](crate::AgentStoreBuilder), which also wires
/// the partner graph; the set of lights is fixed afterwards.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    lights: Vec<TrafficLight>,
}

impl AgentStore {
    pub(crate) fn new(lights: Vec<TrafficLight>) -> Self {
        Self { lights }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, agent: AgentId) -> AgentResult<&TrafficLight> {
        self.lights.get(agent.index()).ok_or(AgentError::AgentNotFound(agent))
    }

    pub fn get_mut(&mut self, agent: AgentId) -> AgentResult<&mut TrafficLight> {
        self.lights.get_mut(agent.index()).ok_or(AgentError::AgentNotFound(agent))
    }

    /// Lights in `AgentId` order.
    pub fn iter(&self) -> impl Iterator<Item = &TrafficLight> + '_ {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrafficLight> + '_ {
        self.lights.iter_mut()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.lights.iter().map(TrafficLight::id)
    }

    pub fn find(&self, name: &str) -> Option<AgentId> {
        self.lights.iter().find(|l| l.name() == name).map(TrafficLight::id)
    }

    /// Name of `agent`, or `"?"` for an unknown id.  For log fields.
    pub fn name(&self, agent: AgentId) -> &str {
        self.lights.get(agent.index()).map_or("?", TrafficLight::name)
    }

    /// Announce `intention` on behalf of its agent.
    ///
    /// Records it in the sender's outbound table (replacing any earlier
    /// intention for the same turn), then appends it to each partner's inbox
    /// in partner-list order.  Returns the number of partners reached.
    pub fn broadcast(&mut self, intention: Intention) -> AgentResult<usize> {
        let from = intention.agent();
        let partners = {
            let sender = self.get_mut(from)?;
            sender.record_outbound(intention.clone());
            sender.partners().to_vec()
        };
        for &to in &partners {
            self.get_mut(to)?.receive(intention.clone())?;
        }
        debug!(
            from = %self.name(from),
            action = %intention.action(),
            turn = %intention.turn(),
            partners = partners.len(),
            "intention broadcast"
        );
        Ok(partners.len())
    }

    /// Clear the per-run state of every light and apply `retention` to their
    /// inboxes.
    pub fn reset_for_run(&mut self, retention: IntentionRetention) {
        for light in &mut self.lights {
            light.reset_for_run();
            light.set_retention(retention);
        }
    }
}
