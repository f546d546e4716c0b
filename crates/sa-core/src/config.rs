//! Immutable run configuration.
//!
//! `EngineConfig` is built once (defaults, a TOML file, CLI overrides) and
//! handed to the decision engine at construction; nothing reads a shared
//! global.  `GenerationSchedule` drives the experiment loop around the
//! engine.

use crate::{CoreError, CoreResult};

// ── IntentionRetention ────────────────────────────────────────────────────────

/// How many received intentions an agent keeps over a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IntentionRetention {
    /// Every received intention is kept for the rest of the run.
    #[default]
    Unbounded,
    /// Only the most recent intention of each partner is kept, whatever its
    /// turn.  At most one entry per partner.
    Latest,
    /// At most `n` intentions in total across all turns; the oldest turn
    /// loses its earliest arrival first.
    Capped(usize),
}

impl IntentionRetention {
    /// Bound on the total number of stored intentions, if any.
    #[inline]
    pub fn cap(self) -> Option<usize> {
        match self {
            IntentionRetention::Capped(n) => Some(n),
            IntentionRetention::Unbounded | IntentionRetention::Latest => None,
        }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Parameters of the per-tick decision engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Probability of applying the cooperative rule when its weight is lower
    /// than the individually intended rule's.
    pub p_coop: f64,

    /// Agents reevaluate their rule every this many simulator steps.
    pub reevaluation_interval: u64,

    /// Green phases older than this trigger the `maxGreenPhaseTimeReached`
    /// user rule.
    pub max_green_phase_time: f64,

    /// Yellow phases older than this trigger `maxYellowPhaseTimeReached`.
    pub max_yellow_phase_time: f64,

    /// A run stops once simulated time reaches this value.
    pub max_simulation_time: f64,

    /// Inbound intention retention policy.
    pub intention_retention: IntentionRetention,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            p_coop:                0.5,
            reevaluation_interval: 5,
            max_green_phase_time:  225.0,
            max_yellow_phase_time: 5.0,
            max_simulation_time:   10_000.0,
            intention_retention:   IntentionRetention::Unbounded,
            seed:                  0,
        }
    }
}

impl EngineConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.p_coop) {
            return Err(CoreError::Probability { name: "p_coop", value: self.p_coop });
        }
        if self.reevaluation_interval == 0 {
            return Err(CoreError::Config("reevaluation_interval must be at least 1".into()));
        }
        if self.intention_retention == IntentionRetention::Capped(0) {
            return Err(CoreError::Config("intention retention cap must be at least 1".into()));
        }
        if self.max_simulation_time <= 0.0 {
            return Err(CoreError::Config("max_simulation_time must be positive".into()));
        }
        Ok(())
    }

    /// Copy of `self` with a different run budget.
    pub fn with_max_simulation_time(&self, max_simulation_time: f64) -> Self {
        Self { max_simulation_time, ..self.clone() }
    }
}

// ── GenerationSchedule ────────────────────────────────────────────────────────

/// Outer training loop parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationSchedule {
    /// Number of generations to train.
    pub total_generations: u32,

    /// Every individual must be selected at least this many times per
    /// generation before the generation ends.
    pub runs_per_individual: u32,

    /// `(first_generation, max_simulation_time)` steps, sorted by
    /// generation.  Generation `g` uses the budget of the last step whose
    /// `first_generation <= g`.
    pub run_time_steps: Vec<(u32, f64)>,
}

impl Default for GenerationSchedule {
    fn default() -> Self {
        Self {
            total_generations:   50,
            runs_per_individual: 3,
            run_time_steps:      vec![(1, 10_000.0), (5, 6_000.0), (15, 4_000.0)],
        }
    }
}

impl GenerationSchedule {
    /// Run budget for 1-based `generation`, falling back to `default` when no
    /// step applies.
    pub fn max_simulation_time(&self, generation: u32, default: f64) -> f64 {
        self.run_time_steps
            .iter()
            .filter(|(first, _)| *first <= generation)
            .next_back()
            .map(|&(_, budget)| budget)
            .unwrap_or(default)
    }

    /// `true` if `generation` is the last one, after which no new generation
    /// is bred.
    #[inline]
    pub fn is_final(&self, generation: u32) -> bool {
        generation + 1 >= self.total_generations
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.total_generations == 0 {
            return Err(CoreError::Config("total_generations must be at least 1".into()));
        }
        if self.runs_per_individual == 0 {
            return Err(CoreError::Config("runs_per_individual must be at least 1".into()));
        }
        if self.run_time_steps.windows(2).any(|w| w[0].0 > w[1].0) {
            return Err(CoreError::Config("run_time_steps must be sorted by generation".into()));
        }
        Ok(())
    }
}
