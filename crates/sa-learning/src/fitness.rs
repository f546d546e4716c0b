//! Run-end fitness scoring.

use crate::Individual;

/// Scores an individual once its run has ended.  Higher is better.
pub trait FitnessFunction: Send + Sync {
    fn run_fitness(&self, individual: &Individual, run_time: f64) -> f64;
}

/// Negated run cost, inflated by the individual's penalty rate.
///
/// ```text
/// cost    = run_time + wait_weight · aggregate_vehicle_wait_time
/// fitness = −cost · (1 + penalty_rate)
/// ```
///
/// A run that clears traffic sooner, with less wait carried by departing
/// vehicles and more improving decisions, scores higher.
#[derive(Clone, Debug, PartialEq)]
pub struct RunFitness {
    pub wait_weight: f64,
}

impl Default for RunFitness {
    fn default() -> Self {
        Self { wait_weight: 0.01 }
    }
}

impl FitnessFunction for RunFitness {
    fn run_fitness(&self, individual: &Individual, run_time: f64) -> f64 {
        let cost = run_time + self.wait_weight * individual.aggregate_vehicle_wait_time();
        -cost * (1.0 + individual.penalty().rate())
    }
}
