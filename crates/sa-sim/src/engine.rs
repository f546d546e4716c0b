//! The `DecisionEngine` and its tick loop.

use tracing::{debug, info};

use sa_agent::{AgentRngs, AgentStore, AppliedRule, Phase, WaitSnapshot};
use sa_core::{AgentId, AgentRng, EngineConfig, SimClock, SimRng, Turn};
use sa_learning::{AgentPool, FitnessFunction, Individual, RunBindings, RunFitness, TemporalDifference, WeightUpdate};
use sa_rules::{Action, Intention, PredicateRegistry, Rule, RuleRef, UserAction, UserRule};

use crate::credit::CreditAssessment;
use crate::evaluator::{EvalContext, RuleEvaluator};
use crate::state::{intersection_wait_time, IntersectionState};
use crate::{
    DecisionRecord, DecisionSource, EngineObserver, RunReport, SimError, SimResult, TrafficSimulator,
    WeightUpdateRecord,
};

// ── Cooperative tie-break ─────────────────────────────────────────────────────

/// How the intended RS rule and the chosen RSint rule were reconciled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No RSint rule applied.
    Intended,
    /// The RSint rule weighed at least as much as the RS rule.
    CoopByWeight,
    /// The RSint rule was lighter but won the pCoop draw.
    CoopByChance,
    /// The RSint rule was lighter and lost the pCoop draw.
    IntendedByChance,
}

impl Resolution {
    #[inline]
    pub fn picks_coop(self) -> bool {
        matches!(self, Resolution::CoopByWeight | Resolution::CoopByChance)
    }

    #[inline]
    pub fn is_tie_break(self) -> bool {
        matches!(self, Resolution::CoopByChance | Resolution::IntendedByChance)
    }
}

/// Reconcile an intended RS rule of weight `intended` with an optional RSint
/// rule of weight `coop`.  The RNG is drawn from only when the RSint rule is
/// strictly lighter.
pub fn resolve_cooperation(intended: f64, coop: Option<f64>, p_coop: f64, rng: &mut AgentRng) -> Resolution {
    match coop {
        None => Resolution::Intended,
        Some(c) if c >= intended => Resolution::CoopByWeight,
        Some(_) if rng.gen_bool(p_coop) => Resolution::CoopByChance,
        Some(_) => Resolution::IntendedByChance,
    }
}

// ── User rule transforms ──────────────────────────────────────────────────────

/// Phase after `current` once a yellow phase has run out: the next one, or
/// phase 0 once `current` is at or past the second-to-last entry.
pub fn advance_target(phase_count: usize, current: u32) -> u32 {
    if current as usize + 2 >= phase_count { 0 } else { current + 1 }
}

/// Yellow counterpart of the green phase at `current`, found by name.  Falls
/// back to the next phase in the program.
pub fn yellow_target(phases: &[Phase], current: u32) -> u32 {
    phases
        .get(current as usize)
        .and_then(Phase::yellow_counterpart)
        .and_then(|name| phases.iter().position(|p| p.name == name))
        .map(|i| i as u32)
        .unwrap_or_else(|| {
            if phases.is_empty() { 0 } else { (current + 1) % phases.len() as u32 }
        })
}

// ── Per-run state ─────────────────────────────────────────────────────────────

struct RunState {
    clock:    SimClock,
    turn:     Turn,
    bindings: RunBindings,
    report:   RunReport,
}

enum Choice {
    User(usize),
    NoRule,
    Learned {
        intended: RuleRef,
        action:   Action,
        coop:     Option<RuleRef>,
        resolved: Resolution,
    },
}

// ── DecisionEngine ────────────────────────────────────────────────────────────

/// The per-step decision engine.
///
/// Owns the lights, their pools, the predicate registry, and the user
/// rules.  Each call to [`run`](Self::run) drives one simulation run:
///
/// 1. **Bind**: reset per-run agent state and bind every light to an
///    individual of its pool.
/// 2. **Initial decisions**: every light resolves and applies a rule before
///    the first step, without credit assignment.
/// 3. **Loop**: step the simulator; on every `reevaluation_interval`-th
///    step (step 0 included) every light, in `AgentId` order, observes its
///    intersection, checks user rules, otherwise selects and announces an
///    RS rule, reconciles it with an RSint rule, credits the outgoing rule,
///    and applies the resolved one.
/// 4. **Run end**: record run time and fitness on every bound individual.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct DecisionEngine<W: WeightUpdate = TemporalDifference, F: FitnessFunction = RunFitness> {
    pub(crate) config:        EngineConfig,
    pub(crate) registry:      PredicateRegistry,
    pub(crate) user_rules:    Vec<UserRule>,
    pub(crate) agents:        AgentStore,
    pub(crate) rngs:          AgentRngs,
    pub(crate) pools:         Vec<AgentPool>,
    pub(crate) weight_update: W,
    pub(crate) fitness:       F,
    pub(crate) run_rng:       SimRng,
    pub(crate) runs:          u64,
}

impl<W: WeightUpdate, F: FitnessFunction> DecisionEngine<W, F> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn pools(&self) -> &[AgentPool] {
        &self.pools
    }

    /// Mutable pool access for the generation loop.  Must not be used to
    /// install rules the registry has not validated; see
    /// [`validate_catalogs`](Self::validate_catalogs).
    pub fn pools_mut(&mut self) -> &mut [AgentPool] {
        &mut self.pools
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn user_rules(&self) -> &[UserRule] {
        &self.user_rules
    }

    /// Runs completed so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn into_parts(self) -> (AgentStore, Vec<AgentPool>) {
        (self.agents, self.pools)
    }

    /// Check every rule of every pool against the registry.
    pub fn validate_catalogs(&self) -> SimResult<()> {
        validate_pools(&self.registry, &self.pools)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until traffic clears or `config.max_simulation_time` is reached.
    pub fn run<S, O>(&mut self, sim: &mut S, observer: &mut O) -> SimResult<RunReport>
    where
        S: TrafficSimulator + ?Sized,
        O: EngineObserver,
    {
        let budget = self.config.max_simulation_time;
        self.run_with_budget(sim, budget, observer)
    }

    /// Run until traffic clears or simulated time reaches `max_simulation_time`.
    pub fn run_with_budget<S, O>(
        &mut self,
        sim:                 &mut S,
        max_simulation_time: f64,
        observer:            &mut O,
    ) -> SimResult<RunReport>
    where
        S: TrafficSimulator + ?Sized,
        O: EngineObserver,
    {
        let run_index = self.runs;
        self.runs += 1;

        // ── Bind ──────────────────────────────────────────────────────────
        self.agents.reset_for_run(self.config.intention_retention);
        self.rngs = AgentRngs::new(self.agents.len(), self.run_rng.random());
        let bindings = RunBindings::assign(&mut self.pools, &mut self.run_rng)?;
        let ids: Vec<AgentId> = self.agents.agent_ids().collect();
        for &agent in &ids {
            bindings.get(agent)?;
        }

        let mut run = RunState {
            clock:  SimClock::new(self.config.reevaluation_interval),
            turn:   Turn::FIRST,
            bindings,
            report: RunReport { run: run_index, ..RunReport::default() },
        };
        info!(run = run_index, agents = ids.len(), budget = max_simulation_time, "run started");
        observer.on_run_start(run_index, &self.agents);

        // ── Initial decisions ─────────────────────────────────────────────
        for &agent in &ids {
            self.decide(sim, agent, &mut run, false, observer)?;
        }

        // ── Loop ──────────────────────────────────────────────────────────
        while sim.min_expected_vehicles() > 0 && sim.time() < max_simulation_time {
            sim.step()?;
            run.report.steps += 1;

            if run.clock.is_reevaluation_tick() {
                run.turn = run.turn.next();
                for &agent in &ids {
                    self.decide(sim, agent, &mut run, true, observer)?;
                }
                run.clock.decisions += 1;
                run.report.reevaluations += 1;
                observer.on_reevaluation(run.clock.current_tick, sim.time());
            }
            run.clock.advance();
        }

        // ── Run end ───────────────────────────────────────────────────────
        let run_time = sim.time();
        let bound: Vec<AgentId> = run.bindings.iter().map(|(a, _)| a).collect();
        for agent in bound {
            let individual = run.bindings.individual_mut(&mut self.pools, agent)?;
            individual.update_last_run_time(run_time);
            let fitness = self.fitness.run_fitness(individual, run_time);
            individual.update_fitness(fitness);
            debug!(%agent, individual = %individual.id(), fitness, "run fitness recorded");
        }

        let mut report = run.report;
        report.run_time = run_time;
        report.do_nothing = self.agents.iter().map(|l| (l.id(), l.do_nothing_count())).collect();
        info!(
            run = run_index,
            run_time,
            steps = report.steps,
            decisions = report.decisions.total(),
            weight_updates = report.weight_updates,
            "run finished"
        );
        observer.on_run_end(&report, &self.agents, &self.pools);
        Ok(report)
    }

    // ── One light, one decision ───────────────────────────────────────────

    fn decide<S, O>(
        &mut self,
        sim:          &mut S,
        agent:        AgentId,
        run:          &mut RunState,
        reevaluation: bool,
        observer:     &mut O,
    ) -> SimResult<()>
    where
        S: TrafficSimulator + ?Sized,
        O: EngineObserver,
    {
        let time = sim.time();

        // ── Observe ───────────────────────────────────────────────────────
        let (state, wait_time) = {
            let light = self.agents.get(agent)?;
            (IntersectionState::observe(&*sim, light)?, intersection_wait_time(&*sim, light))
        };
        let after = state.cars_waiting();

        // ── Select ────────────────────────────────────────────────────────
        let choice = {
            let light = self.agents.get(agent)?;
            let ctx = EvalContext { light, state: &state, agents: &self.agents };
            let evaluator = RuleEvaluator::new(&self.registry, &self.config);

            match evaluator.first_applicable_user_rule(&ctx, &self.user_rules)? {
                Some(u) => Choice::User(u),
                None => {
                    let individual = run.bindings.individual(&self.pools, agent)?;
                    let (valid_rs, valid_rs_int) = evaluator.valid_rules(&ctx, individual)?;
                    let rng = self.rngs.get_mut(agent);
                    match individual.select_rule(&valid_rs, rng) {
                        None => Choice::NoRule,
                        Some(intended) => {
                            let coop = individual.select_coop_rule(&valid_rs_int, rng);
                            let intended_rule = lookup(individual, agent, intended)?;
                            let coop_weight = match coop {
                                Some(c) => Some(lookup(individual, agent, c)?.weight),
                                None => None,
                            };
                            let resolved =
                                resolve_cooperation(intended_rule.weight, coop_weight, self.config.p_coop, rng);
                            Choice::Learned { intended, action: intended_rule.action, coop, resolved }
                        }
                    }
                }
            }
        };

        // ── Announce ──────────────────────────────────────────────────────
        if let Choice::Learned { action, .. } = &choice {
            self.agents.broadcast(Intention::new(agent, *action, run.turn, time))?;
        }

        let (next, source, tie_break) = match choice {
            Choice::User(u) => (AppliedRule::User(u), DecisionSource::User, false),
            Choice::NoRule => (AppliedRule::DoNothing, DecisionSource::DoNothing, false),
            Choice::Learned { intended, coop, resolved, .. } => match coop {
                Some(c) if resolved.picks_coop() => {
                    (AppliedRule::Learned(c), DecisionSource::Cooperative, resolved.is_tie_break())
                }
                _ => (AppliedRule::Learned(intended), DecisionSource::Individual, resolved.is_tie_break()),
            },
        };

        // ── Credit ────────────────────────────────────────────────────────
        if reevaluation {
            if let AppliedRule::Learned(incoming) = next {
                self.assign_credit(agent, incoming, &after, time, run, observer)?;
            }
        }
        if next == AppliedRule::DoNothing {
            self.agents.get_mut(agent)?.do_nothing();
            run.bindings
                .individual_mut(&mut self.pools, agent)?
                .update_fitness_penalty(false, false);
        }

        // ── Apply ─────────────────────────────────────────────────────────
        let (phase, rule) = match next {
            AppliedRule::User(u) => (Some(self.apply_user_rule(sim, agent, &state, u)?), None),
            AppliedRule::Learned(r) => {
                let individual = run.bindings.individual(&self.pools, agent)?;
                let rule = lookup(individual, agent, r)?;
                let phase = rule.action.phase();
                if let Some(p) = phase {
                    sim.set_phase(self.agents.name(agent), p)?;
                }
                (phase, Some(rule.id))
            }
            AppliedRule::DoNothing | AppliedRule::Unset => (None, None),
        };

        // ── Record ────────────────────────────────────────────────────────
        let light = self.agents.get_mut(agent)?;
        light.set_current_rule(next);
        light.set_wait_time(wait_time);
        if reevaluation {
            light.update_cars_waiting(after);
        }

        let record = DecisionRecord {
            tick: run.clock.current_tick,
            time,
            turn: run.turn,
            agent,
            source,
            rule,
            phase,
            tie_break,
        };
        debug!(
            light = %self.agents.name(agent),
            %source,
            phase = ?phase,
            tie_break,
            time,
            "decision"
        );
        run.report.decisions.record(source);
        observer.on_decision(&record);
        Ok(())
    }

    /// Score the outgoing rule of `agent` before `incoming` replaces it.
    fn assign_credit<O: EngineObserver>(
        &mut self,
        agent:    AgentId,
        incoming: RuleRef,
        after:    &WaitSnapshot,
        time:     f64,
        run:      &mut RunState,
        observer: &mut O,
    ) -> SimResult<()> {
        let light = self.agents.get(agent)?;
        let outgoing = match light.current_rule() {
            AppliedRule::Learned(r) => r,
            AppliedRule::DoNothing => {
                run.bindings
                    .individual_mut(&mut self.pools, agent)?
                    .update_fitness_penalty(false, false);
                return Ok(());
            }
            AppliedRule::User(_) | AppliedRule::Unset => return Ok(()),
        };

        let assessment = CreditAssessment::assess(light.cars_waiting(), after);
        let individual = run.bindings.individual_mut(&mut self.pools, agent)?;
        individual.update_aggregate_vehicle_wait_time(assessment.throughput_wait_time);

        let incoming_rule = lookup(individual, agent, incoming)?.clone();
        let outgoing_rule = individual
            .rule_mut(outgoing)
            .ok_or(SimError::MissingRule { agent, rule: outgoing })?;
        let old_weight = outgoing_rule.weight;
        let new_weight = self.weight_update.updated_weight(outgoing_rule, &incoming_rule, &assessment.signal);
        outgoing_rule.weight = new_weight;
        let rule = outgoing_rule.id;
        individual.update_fitness_penalty(true, new_weight > old_weight);

        debug!(%agent, %rule, old_weight, new_weight, throughput = assessment.throughput, "weight updated");
        run.report.weight_updates += 1;
        observer.on_weight_update(&WeightUpdateRecord {
            time,
            agent,
            rule,
            old_weight,
            new_weight,
            throughput: assessment.throughput,
        });
        Ok(())
    }

    fn apply_user_rule<S: TrafficSimulator + ?Sized>(
        &self,
        sim:   &mut S,
        agent: AgentId,
        state: &IntersectionState,
        index: usize,
    ) -> SimResult<u32> {
        let light = self.agents.get(agent)?;
        let rule = self
            .user_rules
            .get(index)
            .ok_or_else(|| SimError::Config(format!("no user rule at position {index}")))?;
        let target = match rule.action {
            UserAction::SwitchToYellow => yellow_target(light.phases(), state.phase),
            UserAction::AdvancePhase => advance_target(sim.phase_count(light.name())?, state.phase),
        };
        sim.set_phase(light.name(), target)?;
        Ok(target)
    }
}

fn lookup(individual: &Individual, agent: AgentId, rule: RuleRef) -> SimResult<&Rule> {
    individual.rule(rule).ok_or(SimError::MissingRule { agent, rule })
}

pub(crate) fn validate_pools(registry: &PredicateRegistry, pools: &[AgentPool]) -> SimResult<()> {
    for pool in pools {
        for individual in pool.individuals() {
            for rule in individual.rs().iter().chain(individual.rs_int()) {
                registry.validate_rule(rule)?;
            }
        }
    }
    Ok(())
}
