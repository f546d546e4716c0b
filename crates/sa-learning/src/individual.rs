//! One genome instance: its two rule catalogs and the statistics that score it.

use sa_core::{AgentRng, IndividualId};
use sa_rules::{Rule, RuleKind, RuleRef};

use crate::{LearningError, LearningResult};

// ── FitnessPenalty ────────────────────────────────────────────────────────────

/// Decision outcomes of one run, as recorded by credit assignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessPenalty {
    /// Learned rules that were scored by the weight update.
    pub learned:   u64,
    /// Of those, updates that raised the rule's weight.
    pub improved:  u64,
    /// Decisions that came from no learned rule (do-nothing outcomes).
    pub unlearned: u64,
}

impl FitnessPenalty {
    pub fn record(&mut self, from_learned: bool, improved: bool) {
        if from_learned {
            self.learned += 1;
            if improved {
                self.improved += 1;
            }
        } else {
            self.unlearned += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.learned + self.unlearned
    }

    /// Share of recorded decisions that did not improve a learned rule, in
    /// `[0, 1]`; `0` when nothing was recorded.
    pub fn rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (total - self.improved) as f64 / total as f64
        }
    }
}

// ── Individual ────────────────────────────────────────────────────────────────

/// A rule-set individual owned by an [`AgentPool`](crate::AgentPool).
///
/// `rs` holds individual rules and `rs_int` cooperative ones; the
/// constructor rejects a rule placed in the wrong catalog.  Rules are
/// addressed by [`RuleRef`] so the engine can name the rule it applied
/// without borrowing the individual across ticks.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    id:     IndividualId,
    rs:     Vec<Rule>,
    rs_int: Vec<Rule>,

    fitness:            f64,
    fitness_runs:       u32,
    normalized_fitness: f64,
    penalty:            FitnessPenalty,

    aggregate_vehicle_wait_time: f64,
    selected_count:              u32,
    last_run_time:               f64,
}

impl Individual {
    pub fn new(id: IndividualId, rs: Vec<Rule>, rs_int: Vec<Rule>) -> LearningResult<Self> {
        check_catalog(&rs, RuleKind::Individual)?;
        check_catalog(&rs_int, RuleKind::Cooperative)?;
        Ok(Self {
            id,
            rs,
            rs_int,
            fitness:                     0.0,
            fitness_runs:                0,
            normalized_fitness:          0.0,
            penalty:                     FitnessPenalty::default(),
            aggregate_vehicle_wait_time: 0.0,
            selected_count:              0,
            last_run_time:               0.0,
        })
    }

    /// A fresh individual with `id` and a copy of these catalogs; all
    /// statistics start at zero.
    pub fn offspring(&self, id: IndividualId) -> Self {
        Self {
            id,
            rs: self.rs.clone(),
            rs_int: self.rs_int.clone(),
            fitness:                     0.0,
            fitness_runs:                0,
            normalized_fitness:          0.0,
            penalty:                     FitnessPenalty::default(),
            aggregate_vehicle_wait_time: 0.0,
            selected_count:              0,
            last_run_time:               0.0,
        }
    }

    #[inline]
    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn rs(&self) -> &[Rule] {
        &self.rs
    }

    pub fn rs_int(&self) -> &[Rule] {
        &self.rs_int
    }

    pub fn catalog(&self, kind: RuleKind) -> &[Rule] {
        match kind {
            RuleKind::Individual => &self.rs,
            RuleKind::Cooperative => &self.rs_int,
        }
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> + '_ {
        self.rs.iter_mut().chain(self.rs_int.iter_mut())
    }

    pub fn rule(&self, r: RuleRef) -> Option<&Rule> {
        self.catalog(r.kind).get(r.index)
    }

    pub fn rule_mut(&mut self, r: RuleRef) -> Option<&mut Rule> {
        match r.kind {
            RuleKind::Individual => self.rs.get_mut(r.index),
            RuleKind::Cooperative => self.rs_int.get_mut(r.index),
        }
    }

    // ── Selection policy ──────────────────────────────────────────────────

    /// Pick one of the applicable RS rules; `valid` holds RS indices.
    ///
    /// Roulette-wheel over weights shifted so the lightest candidate still
    /// has a small chance.  Uniform when all weights are equal.  `None` when
    /// `valid` is empty.
    pub fn select_rule(&self, valid: &[usize], rng: &mut AgentRng) -> Option<RuleRef> {
        roulette(&self.rs, valid, rng).map(RuleRef::individual)
    }

    /// As [`select_rule`](Self::select_rule), over RSint indices.
    pub fn select_coop_rule(&self, valid: &[usize], rng: &mut AgentRng) -> Option<RuleRef> {
        roulette(&self.rs_int, valid, rng).map(RuleRef::cooperative)
    }

    // ── Run statistics ────────────────────────────────────────────────────

    /// Mark the individual as assigned for a run.  Bumps the selected count
    /// and clears the previous run's penalty record.
    pub fn selected(&mut self) {
        self.selected_count += 1;
        self.penalty = FitnessPenalty::default();
    }

    #[inline]
    pub fn selected_count(&self) -> u32 {
        self.selected_count
    }

    pub fn reset_selected_count(&mut self) {
        self.selected_count = 0;
    }

    pub fn update_fitness_penalty(&mut self, from_learned: bool, improved: bool) {
        self.penalty.record(from_learned, improved);
    }

    pub fn penalty(&self) -> &FitnessPenalty {
        &self.penalty
    }

    pub fn update_aggregate_vehicle_wait_time(&mut self, wait: f64) {
        self.aggregate_vehicle_wait_time += wait;
    }

    pub fn aggregate_vehicle_wait_time(&self) -> f64 {
        self.aggregate_vehicle_wait_time
    }

    pub fn reset_aggregate_vehicle_wait_time(&mut self) {
        self.aggregate_vehicle_wait_time = 0.0;
    }

    pub fn update_last_run_time(&mut self, time: f64) {
        self.last_run_time = time;
    }

    pub fn last_run_time(&self) -> f64 {
        self.last_run_time
    }

    /// Fold one run's fitness into the generation mean.
    pub fn update_fitness(&mut self, run_fitness: f64) {
        self.fitness_runs += 1;
        self.fitness += (run_fitness - self.fitness) / self.fitness_runs as f64;
    }

    /// Mean run fitness this generation.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Fitness rescaled within the pool to `[0, 1]`; set by
    /// [`AgentPool::normalize_fitnesses`](crate::AgentPool::normalize_fitnesses).
    pub fn normalized_fitness(&self) -> f64 {
        self.normalized_fitness
    }

    pub(crate) fn set_normalized_fitness(&mut self, value: f64) {
        self.normalized_fitness = value;
    }
}

fn check_catalog(rules: &[Rule], catalog: RuleKind) -> LearningResult<()> {
    match rules.iter().find(|r| r.kind != catalog) {
        Some(r) => Err(LearningError::WrongCatalog { rule: r.id, kind: r.kind, catalog }),
        None => Ok(()),
    }
}

/// Index into `catalog` drawn from the `valid` subset.
fn roulette(catalog: &[Rule], valid: &[usize], rng: &mut AgentRng) -> Option<usize> {
    let weights: Vec<f64> = valid
        .iter()
        .filter_map(|&i| catalog.get(i).map(|r| r.weight))
        .collect();
    if weights.len() != valid.len() || weights.is_empty() {
        return None;
    }

    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if !spread.is_finite() || spread <= f64::EPSILON {
        return rng.choose(valid).copied();
    }

    let floor = spread * 0.01;
    let shifted: Vec<f64> = weights.iter().map(|w| w - min + floor).collect();
    match rng.choose_weighted(&shifted) {
        Some(pick) => Some(valid[pick]),
        None => rng.choose(valid).copied(),
    }
}
