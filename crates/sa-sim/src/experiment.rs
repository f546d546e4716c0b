//! Generation loop: repeated runs, fitness normalisation, breeding.

use tracing::info;

use sa_core::{GenerationSchedule, IndividualId, PoolId, SimRng};
use sa_learning::{FitnessFunction, GenerationStrategy, WeightUpdate};

use crate::{DecisionEngine, EngineObserver, SimResult, TrafficSimulator};

/// Best individual of one pool after the last generation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolChampion {
    pub pool:       PoolId,
    pub individual: IndividualId,
    pub fitness:    f64,
}

/// Summary returned by [`Experiment::run`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentReport {
    pub generations: u32,
    pub runs:        u64,
    pub champions:   Vec<PoolChampion>,
}

/// Drives a [`DecisionEngine`] through a [`GenerationSchedule`].
///
/// Each generation repeats simulation runs until every individual of every
/// pool has been selected `runs_per_individual` times, normalises pool
/// fitnesses, and, unless the generation is final, asks the
/// [`GenerationStrategy`] for the next one.
pub struct Experiment<G: GenerationStrategy, W: WeightUpdate, F: FitnessFunction> {
    engine:   DecisionEngine<W, F>,
    schedule: GenerationSchedule,
    strategy: G,
    rng:      SimRng,
}

impl<G: GenerationStrategy, W: WeightUpdate, F: FitnessFunction> Experiment<G, W, F> {
    pub fn new(engine: DecisionEngine<W, F>, schedule: GenerationSchedule, strategy: G) -> SimResult<Self> {
        schedule.validate()?;
        let rng = SimRng::new(engine.config().seed).child(1);
        Ok(Self { engine, schedule, strategy, rng })
    }

    pub fn engine(&self) -> &DecisionEngine<W, F> {
        &self.engine
    }

    pub fn schedule(&self) -> &GenerationSchedule {
        &self.schedule
    }

    pub fn into_engine(self) -> DecisionEngine<W, F> {
        self.engine
    }

    /// Run every generation.  `make_sim(generation, run)` supplies a fresh
    /// simulator for each run; `generation` is 1-based and `run` counts runs
    /// across the whole experiment.
    pub fn run<S, M, O>(&mut self, mut make_sim: M, observer: &mut O) -> SimResult<ExperimentReport>
    where
        S: TrafficSimulator,
        M: FnMut(u32, u64) -> SimResult<S>,
        O: EngineObserver,
    {
        let mut report = ExperimentReport::default();
        let min_runs = self.schedule.runs_per_individual;

        for generation in 1..=self.schedule.total_generations {
            for pool in self.engine.pools_mut() {
                pool.reset_selected_counts();
            }
            let budget = self
                .schedule
                .max_simulation_time(generation, self.engine.config().max_simulation_time);

            loop {
                let mut sim = make_sim(generation, report.runs)?;
                self.engine.run_with_budget(&mut sim, budget, observer)?;
                report.runs += 1;
                if !self.engine.pools().iter().any(|p| p.needs_testing(min_runs)) {
                    break;
                }
            }

            for pool in self.engine.pools_mut() {
                pool.normalize_fitnesses();
            }
            observer.on_generation_end(generation, self.engine.pools());
            info!(generation, runs = report.runs, budget, "generation finished");
            report.generations = generation;

            if !self.schedule.is_final(generation) {
                for pool in self.engine.pools_mut() {
                    self.strategy.next_generation(pool, &mut self.rng)?;
                    pool.reset_selected_counts();
                    pool.reset_aggregate_vehicle_wait_times();
                }
                self.engine.validate_catalogs()?;
            }
        }

        report.champions = self
            .engine
            .pools()
            .iter()
            .filter_map(|p| {
                p.best().map(|b| PoolChampion { pool: p.id(), individual: b.id(), fitness: b.fitness() })
            })
            .collect();
        Ok(report)
    }
}
