//! Fluent builder for constructing `AgentStore` + `AgentRngs` in one step.
//!
//! # Usage
//!
//! ```rust
//! use sa_agent::{AgentStoreBuilder, Phase};
//!
//! let mut builder = AgentStoreBuilder::new(/*seed=*/ 42);
//! let a = builder.add_light("A", ["A_0", "A_1"], [Phase::new("NS_S_G"), Phase::new("NS_S_Y")]);
//! let b = builder.add_light("B", ["B_0"], [Phase::new("EW_S_G"), Phase::new("EW_S_Y")]);
//! builder.link(a, b);
//!
//! let (store, rngs) = builder.build().unwrap();
//! assert_eq!(store.len(), 2);
//! assert_eq!(rngs.len(), 2);
//! assert!(store.get(a).unwrap().is_partner(b));
//! ```

use std::collections::HashSet;

use sa_core::{AgentId, IntentionRetention};

use crate::{AgentError, AgentResult, AgentRngs, AgentStore, Phase, TrafficLight};

struct PendingLight {
    name:   String,
    lanes:  Vec<String>,
    phases: Vec<Phase>,
}

/// Fluent builder for [`AgentStore`] + [`AgentRngs`].
///
/// Lights receive consecutive `AgentId`s in insertion order.  Partner links
/// are symmetric: `link(a, b)` makes each a partner of the other.
pub struct AgentStoreBuilder {
    seed:      u64,
    retention: IntentionRetention,
    lights:    Vec<PendingLight>,
    links:     Vec<(AgentId, AgentId)>,
}

impl AgentStoreBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            retention: IntentionRetention::default(),
            lights:    Vec::new(),
            links:     Vec::new(),
        }
    }

    /// Inbox retention policy for every light.
    pub fn retention(&mut self, retention: IntentionRetention) -> &mut Self {
        self.retention = retention;
        self
    }

    pub fn add_light<L, P>(&mut self, name: impl Into<String>, lanes: L, phases: P) -> AgentId
    where
        L: IntoIterator,
        L::Item: Into<String>,
        P: IntoIterator<Item = Phase>,
    {
        let id = AgentId(self.lights.len() as u32);
        self.lights.push(PendingLight {
            name:   name.into(),
            lanes:  lanes.into_iter().map(Into::into).collect(),
            phases: phases.into_iter().collect(),
        });
        id
    }

    /// Make `a` and `b` communication partners of each other.
    pub fn link(&mut self, a: AgentId, b: AgentId) -> &mut Self {
        self.links.push((a, b));
        self
    }

    /// Construct `AgentStore` and `AgentRngs`.
    ///
    /// # Errors
    ///
    /// - [`AgentError::DuplicateName`] if two lights share a name.
    /// - [`AgentError::NoPhases`] for a light without a phase program.
    /// - [`AgentError::SelfPartner`] for `link(a, a)`.
    /// - [`AgentError::AgentNotFound`] for a link to an id never added.
    pub fn build(self) -> AgentResult<(AgentStore, AgentRngs)> {
        let mut seen = HashSet::new();
        for light in &self.lights {
            if !seen.insert(light.name.as_str()) {
                return Err(AgentError::DuplicateName(light.name.clone()));
            }
            if light.phases.is_empty() {
                return Err(AgentError::NoPhases(light.name.clone()));
            }
        }

        let count = self.lights.len();
        let mut lights: Vec<TrafficLight> = self
            .lights
            .into_iter()
            .enumerate()
            .map(|(i, p)| TrafficLight::new(AgentId(i as u32), p.name, p.lanes, p.phases, self.retention))
            .collect();

        for (a, b) in self.links {
            if a == b {
                return Err(AgentError::SelfPartner(a));
            }
            for id in [a, b] {
                if id.index() >= count {
                    return Err(AgentError::AgentNotFound(id));
                }
            }
            lights[a.index()].add_partner(b);
            lights[b.index()].add_partner(a);
        }

        Ok((AgentStore::new(lights), AgentRngs::new(count, self.seed)))
    }
}
