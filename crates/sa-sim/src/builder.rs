//! Fluent builder for constructing a [`DecisionEngine`].

use std::collections::BTreeMap;

use sa_agent::{AgentRngs, AgentStore};
use sa_core::{AgentId, EngineConfig, SimRng};
use sa_learning::{AgentPool, FitnessFunction, RunFitness, TemporalDifference, WeightUpdate};
use sa_rules::{PredicateRegistry, UserRule};

use crate::engine::validate_pools;
use crate::{DecisionEngine, SimError, SimResult};

/// Fluent builder for [`DecisionEngine<W, F>`].
///
/// # Required inputs
///
/// - [`EngineConfig`]: pCoop, reevaluation cadence, phase limits, seed, …
/// - [`AgentStore`]: from [`sa_agent::AgentStoreBuilder`]
/// - `Vec<AgentPool>`: one pool per group of lights, indexed by `PoolId`
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                          |
/// |---------------------------|----------------------------------|
/// | `.registry(r)`            | `PredicateRegistry::standard()`  |
/// | `.user_rules(v)`          | `UserRule::standard_set()`       |
/// | `.with_weight_update(w)`  | `TemporalDifference::default()`  |
/// | `.with_fitness(f)`        | `RunFitness::default()`          |
///
/// # Example
///
/// ```rust,ignore
/// let (agents, _) = AgentStoreBuilder::new(seed).add_light(..).build()?;
/// let mut engine = EngineBuilder::new(config, agents, pools)
///     .registry(registry)
///     .build()?;
/// engine.run(&mut simulator, &mut NoopObserver)?;
/// ```
pub struct EngineBuilder<W: WeightUpdate = TemporalDifference, F: FitnessFunction = RunFitness> {
    config:        EngineConfig,
    agents:        AgentStore,
    pools:         Vec<AgentPool>,
    registry:      Option<PredicateRegistry>,
    user_rules:    Option<Vec<UserRule>>,
    weight_update: W,
    fitness:       F,
}

impl EngineBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: EngineConfig, agents: AgentStore, pools: Vec<AgentPool>) -> Self {
        Self {
            config,
            agents,
            pools,
            registry: None,
            user_rules: None,
            weight_update: TemporalDifference::default(),
            fitness: RunFitness::default(),
        }
    }
}

impl<W: WeightUpdate, F: FitnessFunction> EngineBuilder<W, F> {
    /// Supply the predicate registry every rule condition is resolved in.
    pub fn registry(mut self, registry: PredicateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the user rules.  Earlier entries take precedence.
    pub fn user_rules(mut self, rules: Vec<UserRule>) -> Self {
        self.user_rules = Some(rules);
        self
    }

    pub fn with_weight_update<W2: WeightUpdate>(self, weight_update: W2) -> EngineBuilder<W2, F> {
        EngineBuilder {
            config: self.config,
            agents: self.agents,
            pools: self.pools,
            registry: self.registry,
            user_rules: self.user_rules,
            weight_update,
            fitness: self.fitness,
        }
    }

    pub fn with_fitness<F2: FitnessFunction>(self, fitness: F2) -> EngineBuilder<W, F2> {
        EngineBuilder {
            config: self.config,
            agents: self.agents,
            pools: self.pools,
            registry: self.registry,
            user_rules: self.user_rules,
            weight_update: self.weight_update,
            fitness,
        }
    }

    /// Validate inputs and return a ready-to-run [`DecisionEngine`].
    ///
    /// # Errors
    ///
    /// - the config is invalid;
    /// - a pool's id does not match its position;
    /// - a pool has no lights or fewer individuals than lights;
    /// - a light belongs to no pool or to several, or
    ///   a pool names a light the store does not hold;
    /// - a user rule or catalog rule names a predicate the registry lacks.
    pub fn build(self) -> SimResult<DecisionEngine<W, F>> {
        self.config.validate()?;

        // ── Pools and membership ──────────────────────────────────────────
        let mut membership: BTreeMap<AgentId, usize> = BTreeMap::new();
        for (i, pool) in self.pools.iter().enumerate() {
            if pool.id().index() != i {
                return Err(SimError::Config(format!("pool {} is stored at position {i}", pool.id())));
            }
            if pool.agents().is_empty() {
                return Err(SimError::Config(format!("pool {} controls no traffic lights", pool.id())));
            }
            if pool.individuals().len() < pool.agents().len() {
                return Err(SimError::Config(format!(
                    "pool {} has {} individuals for {} traffic lights",
                    pool.id(),
                    pool.individuals().len(),
                    pool.agents().len()
                )));
            }
            for &agent in pool.agents() {
                self.agents.get(agent)?;
                *membership.entry(agent).or_default() += 1;
            }
        }
        for agent in self.agents.agent_ids() {
            match membership.get(&agent).copied().unwrap_or(0) {
                1 => {}
                0 => return Err(SimError::Config(format!("{agent} belongs to no pool"))),
                n => return Err(SimError::Config(format!("{agent} belongs to {n} pools"))),
            }
        }

        // ── Rules ─────────────────────────────────────────────────────────
        let registry = self.registry.unwrap_or_else(PredicateRegistry::standard);
        let user_rules = self.user_rules.unwrap_or_else(UserRule::standard_set);
        for rule in &user_rules {
            registry.validate_user_rule(rule)?;
        }
        validate_pools(&registry, &self.pools)?;

        let rngs = AgentRngs::new(self.agents.len(), self.config.seed);

        Ok(DecisionEngine {
            run_rng:       SimRng::new(self.config.seed),
            config:        self.config,
            registry,
            user_rules,
            agents:        self.agents,
            rngs,
            pools:         self.pools,
            weight_update: self.weight_update,
            fitness:       self.fitness,
            runs:          0,
        })
    }
}
