//! Agent pools and the per-run agent → individual binding table.

use std::collections::BTreeMap;

use tracing::debug;

use sa_core::{AgentId, IndividualId, PoolId, SimRng};

use crate::{Individual, LearningError, LearningResult};

// ── AgentPool ─────────────────────────────────────────────────────────────────

/// A population of individuals shared by one or more traffic lights.
///
/// The pool owns its individuals.  At the start of a run each member agent
/// is bound to one of them through [`RunBindings`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPool {
    id:          PoolId,
    agents:      Vec<AgentId>,
    individuals: Vec<Individual>,
    next_id:     u32,
    generation:  u32,
}

impl AgentPool {
    pub fn new(id: PoolId, individuals: Vec<Individual>) -> LearningResult<Self> {
        if individuals.is_empty() {
            return Err(LearningError::EmptyPool(id));
        }
        let next_id = individuals.iter().map(|i| i.id().0 + 1).max().unwrap_or(0);
        Ok(Self { id, agents: Vec::new(), individuals, next_id, generation: 0 })
    }

    #[inline]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Lights drawing their individual from this pool.
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn add_agent(&mut self, agent: AgentId) {
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individual(&self, index: usize) -> LearningResult<&Individual> {
        self.individuals
            .get(index)
            .ok_or(LearningError::IndividualOutOfRange { pool: self.id, index })
    }

    pub fn individual_mut(&mut self, index: usize) -> LearningResult<&mut Individual> {
        let pool = self.id;
        self.individuals
            .get_mut(index)
            .ok_or(LearningError::IndividualOutOfRange { pool, index })
    }

    pub fn individuals_mut(&mut self) -> impl Iterator<Item = &mut Individual> + '_ {
        self.individuals.iter_mut()
    }

    /// Generations bred so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Next unused individual id; ids stay unique across generations.
    pub fn allocate_id(&mut self) -> IndividualId {
        let id = IndividualId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Pick the individual for the next run: the least-selected one, ties
    /// broken at random.  Its selected count is bumped.
    pub fn select_individual(&mut self, rng: &mut SimRng) -> LearningResult<usize> {
        self.select_individual_excluding(rng, &[])
    }

    /// [`select_individual`](Self::select_individual) restricted to the
    /// individuals whose index is not in `taken`.
    ///
    /// # Errors
    ///
    /// [`LearningError::PoolExhausted`] when every individual is taken.
    pub fn select_individual_excluding(&mut self, rng: &mut SimRng, taken: &[usize]) -> LearningResult<usize> {
        let (pool, individuals) = (self.id, self.individuals.len());
        let exhausted = move || LearningError::PoolExhausted { pool, individuals };
        let free: Vec<usize> = (0..self.individuals.len()).filter(|idx| !taken.contains(idx)).collect();
        let min = free
            .iter()
            .map(|&idx| self.individuals[idx].selected_count())
            .min()
            .ok_or_else(exhausted)?;
        let candidates: Vec<usize> = free
            .into_iter()
            .filter(|&idx| self.individuals[idx].selected_count() == min)
            .collect();
        let index = *rng.choose(&candidates).ok_or_else(exhausted)?;
        self.individuals[index].selected();
        Ok(index)
    }

    /// `true` while some individual has run fewer than `min_runs` times.
    pub fn needs_testing(&self, min_runs: u32) -> bool {
        self.individuals.iter().any(|i| i.selected_count() < min_runs)
    }

    /// Min-max rescale of fitness into `[0, 1]` (best = 1).  A pool whose
    /// individuals all share one fitness normalises to 1 everywhere.
    pub fn normalize_fitnesses(&mut self) {
        let min = self.individuals.iter().map(Individual::fitness).fold(f64::INFINITY, f64::min);
        let max = self.individuals.iter().map(Individual::fitness).fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;
        for ind in &mut self.individuals {
            let value = if spread.is_finite() && spread > 0.0 {
                (ind.fitness() - min) / spread
            } else {
                1.0
            };
            ind.set_normalized_fitness(value);
        }
    }

    /// Individual with the highest fitness.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    pub fn reset_selected_counts(&mut self) {
        self.individuals.iter_mut().for_each(Individual::reset_selected_count);
    }

    pub fn reset_aggregate_vehicle_wait_times(&mut self) {
        self.individuals.iter_mut().for_each(Individual::reset_aggregate_vehicle_wait_time);
    }

    /// Install a bred population.
    pub fn replace_generation(&mut self, next: Vec<Individual>) -> LearningResult<()> {
        if next.is_empty() {
            return Err(LearningError::EmptyPool(self.id));
        }
        self.individuals = next;
        self.generation += 1;
        debug!(pool = %self.id, generation = self.generation, size = self.individuals.len(), "generation replaced");
        Ok(())
    }
}

// ── RunBindings ───────────────────────────────────────────────────────────────

/// Where an agent's individual lives for the current run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    pub pool:       PoolId,
    pub individual: usize,
}

/// Agent → assigned individual, for exactly one run.
///
/// The table is the only link from an agent to its individual; the pool
/// keeps ownership.
#[derive(Clone, Debug, Default)]
pub struct RunBindings {
    by_agent: BTreeMap<AgentId, Binding>,
}

impl RunBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every member agent of every pool to a freshly selected
    /// individual.  Pools are visited in slice order and agents in
    /// membership order.  No individual is bound to two agents of one run.
    ///
    /// # Errors
    ///
    /// [`LearningError::PoolExhausted`] when a pool holds fewer individuals
    /// than member agents.
    pub fn assign(pools: &mut [AgentPool], rng: &mut SimRng) -> LearningResult<Self> {
        let mut bindings = Self::new();
        for pool in pools.iter_mut() {
            let mut taken = Vec::with_capacity(pool.agents().len());
            for agent in pool.agents().to_vec() {
                let individual = pool.select_individual_excluding(rng, &taken)?;
                taken.push(individual);
                debug!(%agent, pool = %pool.id(), individual = %pool.individuals[individual].id(), "individual assigned");
                bindings.bind(agent, Binding { pool: pool.id(), individual });
            }
        }
        Ok(bindings)
    }

    pub fn bind(&mut self, agent: AgentId, binding: Binding) {
        self.by_agent.insert(agent, binding);
    }

    pub fn get(&self, agent: AgentId) -> LearningResult<Binding> {
        self.by_agent.get(&agent).copied().ok_or(LearningError::Unbound(agent))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Binding)> + '_ {
        self.by_agent.iter().map(|(a, b)| (*a, *b))
    }

    pub fn len(&self) -> usize {
        self.by_agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_agent.is_empty()
    }

    /// Resolve `agent`'s individual inside `pools` (indexed by `PoolId`).
    pub fn individual<'p>(&self, pools: &'p [AgentPool], agent: AgentId) -> LearningResult<&'p Individual> {
        let b = self.get(agent)?;
        pools
            .get(b.pool.index())
            .ok_or(LearningError::UnknownPool(b.pool))?
            .individual(b.individual)
    }

    pub fn individual_mut<'p>(
        &self,
        pools: &'p mut [AgentPool],
        agent: AgentId,
    ) -> LearningResult<&'p mut Individual> {
        let b = self.get(agent)?;
        pools
            .get_mut(b.pool.index())
            .ok_or(LearningError::UnknownPool(b.pool))?
            .individual_mut(b.individual)
    }
}
