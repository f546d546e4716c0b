//! Generation replacement between runs.

use tracing::info;

use sa_core::SimRng;

use crate::{AgentPool, Individual, LearningError, LearningResult};

/// Breeds a pool's next population from the current one.
///
/// Called by the experiment loop after fitnesses have been normalised, and
/// never while a run is in progress.
pub trait GenerationStrategy: Send + Sync {
    fn next_generation(&self, pool: &mut AgentPool, rng: &mut SimRng) -> LearningResult<()>;
}

/// Carry every individual over unchanged, with its learned weights, and
/// clear its statistics.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeepGeneration;

impl GenerationStrategy for KeepGeneration {
    fn next_generation(&self, pool: &mut AgentPool, _rng: &mut SimRng) -> LearningResult<()> {
        let next = pool.individuals().iter().map(|i| i.offspring(i.id())).collect();
        pool.replace_generation(next)
    }
}

/// Keep the fittest share of the pool and refill it with jittered copies of
/// random survivors.
///
/// Survivors keep their ids.  Each copy gets a new id and every rule weight
/// moved by a uniform draw from `[-weight_jitter, weight_jitter]`.
#[derive(Clone, Debug, PartialEq)]
pub struct TruncationSelection {
    pub survivor_fraction: f64,
    pub weight_jitter:     f64,
}

impl Default for TruncationSelection {
    fn default() -> Self {
        Self { survivor_fraction: 0.5, weight_jitter: 0.1 }
    }
}

impl TruncationSelection {
    pub fn new(survivor_fraction: f64, weight_jitter: f64) -> LearningResult<Self> {
        if !(survivor_fraction > 0.0 && survivor_fraction <= 1.0) {
            return Err(LearningError::Parameter(format!(
                "survivor_fraction must be in (0, 1], got {survivor_fraction}"
            )));
        }
        if !weight_jitter.is_finite() || weight_jitter < 0.0 {
            return Err(LearningError::Parameter(format!(
                "weight_jitter must be finite and non-negative, got {weight_jitter}"
            )));
        }
        Ok(Self { survivor_fraction, weight_jitter })
    }
}

impl GenerationStrategy for TruncationSelection {
    fn next_generation(&self, pool: &mut AgentPool, rng: &mut SimRng) -> LearningResult<()> {
        let size = pool.individuals().len();
        let mut ranked: Vec<&Individual> = pool.individuals().iter().collect();
        ranked.sort_by(|a, b| b.normalized_fitness().total_cmp(&a.normalized_fitness()));

        let keep = ((size as f64 * self.survivor_fraction).ceil() as usize).clamp(1, size);
        let survivors: Vec<Individual> = ranked[..keep].iter().map(|i| i.offspring(i.id())).collect();

        let mut next = survivors.clone();
        while next.len() < size {
            let parent = rng
                .choose(&survivors)
                .ok_or(LearningError::EmptyPool(pool.id()))?;
            let mut child = parent.offspring(pool.allocate_id());
            if self.weight_jitter > 0.0 {
                for rule in child.rules_mut() {
                    rule.weight += rng.gen_range(-self.weight_jitter..=self.weight_jitter);
                }
            }
            next.push(child);
        }

        info!(pool = %pool.id(), kept = keep, bred = size - keep, "next generation bred");
        pool.replace_generation(next)
    }
}
