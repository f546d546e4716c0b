//! Engine observer trait for progress reporting and data collection.

use sa_agent::AgentStore;
use sa_core::Tick;
use sa_learning::AgentPool;

use crate::{DecisionRecord, RunReport, WeightUpdateRecord};

/// Callbacks invoked by [`DecisionEngine::run`][crate::DecisionEngine::run]
/// and [`Experiment::run`][crate::Experiment::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait EngineObserver {
    /// Called once individuals are bound, before the initial decisions.
    fn on_run_start(&mut self, _run: u64, _agents: &AgentStore) {}

    /// Called for every resolved decision, the initial ones included.
    fn on_decision(&mut self, _record: &DecisionRecord) {}

    /// Called after each reinforcement update.
    fn on_weight_update(&mut self, _record: &WeightUpdateRecord) {}

    /// Called after all agents have reevaluated on `tick`.
    fn on_reevaluation(&mut self, _tick: Tick, _time: f64) {}

    /// Called once fitness has been recorded for the run.
    fn on_run_end(&mut self, _report: &RunReport, _agents: &AgentStore, _pools: &[AgentPool]) {}

    /// Called after a generation's fitnesses are normalised, before the next
    /// generation is bred.  `generation` is 1-based.
    fn on_generation_end(&mut self, _generation: u32, _pools: &[AgentPool]) {}
}

/// An [`EngineObserver`] that does nothing.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
