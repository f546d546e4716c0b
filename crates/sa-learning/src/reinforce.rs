//! Online weight update applied to the outgoing rule after each learned
//! decision.

use sa_rules::Rule;

use crate::{LearningError, LearningResult};

/// Traffic response observed between two reevaluations.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CreditSignal {
    /// Departed vehicles over vehicles waiting before; raw count when none
    /// were waiting.
    pub throughput_ratio: f64,
    /// Wait time carried away by departed vehicles over total wait before;
    /// `1` when nothing was waiting.
    pub wait_time_reduced_ratio: f64,
    /// Waiting vehicles after minus waiting vehicles before.
    pub queue_delta: i64,
}

/// The reinforcement rule: the new weight of `outgoing` given what happened
/// while it was applied and which rule replaces it.
pub trait WeightUpdate: Send + Sync {
    fn updated_weight(&self, outgoing: &Rule, incoming: &Rule, signal: &CreditSignal) -> f64;
}

/// One-step temporal-difference update.
///
/// ```text
/// reward = throughput_ratio + wait_time_reduced_ratio − queue_weight · queue_delta
/// w     ← w + α · (reward + γ · w_next − w)
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalDifference {
    pub learning_rate: f64,
    pub discount:      f64,
    pub queue_weight:  f64,
}

impl Default for TemporalDifference {
    fn default() -> Self {
        Self { learning_rate: 0.1, discount: 0.75, queue_weight: 0.1 }
    }
}

impl TemporalDifference {
    pub fn new(learning_rate: f64, discount: f64, queue_weight: f64) -> LearningResult<Self> {
        for (name, v) in [("learning_rate", learning_rate), ("discount", discount)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(LearningError::Parameter(format!("{name} must be in [0, 1], got {v}")));
            }
        }
        if !queue_weight.is_finite() || queue_weight < 0.0 {
            return Err(LearningError::Parameter(format!(
                "queue_weight must be finite and non-negative, got {queue_weight}"
            )));
        }
        Ok(Self { learning_rate, discount, queue_weight })
    }

    pub fn reward(&self, signal: &CreditSignal) -> f64 {
        signal.throughput_ratio + signal.wait_time_reduced_ratio
            - self.queue_weight * signal.queue_delta as f64
    }
}

impl WeightUpdate for TemporalDifference {
    fn updated_weight(&self, outgoing: &Rule, incoming: &Rule, signal: &CreditSignal) -> f64 {
        let target = self.reward(signal) + self.discount * incoming.weight;
        outgoing.weight + self.learning_rate * (target - outgoing.weight)
    }
}
