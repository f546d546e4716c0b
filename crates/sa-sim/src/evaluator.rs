//! Rule applicability.

use sa_agent::{AgentStore, TrafficLight};
use sa_core::EngineConfig;
use sa_learning::Individual;
use sa_rules::{PredicateRegistry, Rule, RuleKind, UserRule};

use crate::state::{coop_params, IntersectionState};
use crate::{SimError, SimResult};

/// Everything a condition may read while one light is being evaluated.
pub struct EvalContext<'a> {
    pub light:  &'a TrafficLight,
    pub state:  &'a IntersectionState,
    pub agents: &'a AgentStore,
}

/// Decides whether rules apply, by dispatching every condition through the
/// predicate registry with parameters extracted for its family.
pub struct RuleEvaluator<'a> {
    registry: &'a PredicateRegistry,
    config:   &'a EngineConfig,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(registry: &'a PredicateRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Applicability of `rule`, by its kind.
    pub fn evaluate(&self, ctx: &EvalContext<'_>, rule: &Rule) -> SimResult<bool> {
        match rule.kind {
            RuleKind::Individual => self.evaluate_individual(ctx, rule),
            RuleKind::Cooperative => self.evaluate_cooperative(ctx, rule),
        }
    }

    /// All conditions hold against the light's own state.  Stops at the
    /// first false condition.  A cooperative rule is handed to
    /// [`evaluate_cooperative`](Self::evaluate_cooperative).
    pub fn evaluate_individual(&self, ctx: &EvalContext<'_>, rule: &Rule) -> SimResult<bool> {
        if rule.kind == RuleKind::Cooperative {
            return self.evaluate_cooperative(ctx, rule);
        }
        for cond in &rule.conditions {
            let params = ctx.state.params(self.registry.family(cond)?, self.config);
            if !self.registry.evaluate(cond, &params)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// All conditions hold for every received intention, across every
    /// turn.  One failing intention rejects the rule; with no intentions
    /// received the rule applies.  An individual rule is handed to
    /// [`evaluate_individual`](Self::evaluate_individual).
    ///
    /// # Errors
    ///
    /// [`SimError::ForeignIntention`] if the inbox holds an intention from an
    /// agent outside the light's partner list.
    pub fn evaluate_cooperative(&self, ctx: &EvalContext<'_>, rule: &Rule) -> SimResult<bool> {
        if rule.kind == RuleKind::Individual {
            return self.evaluate_individual(ctx, rule);
        }
        for intention in ctx.light.received_intentions().iter() {
            if !ctx.light.is_partner(intention.agent()) {
                return Err(SimError::ForeignIntention { from: intention.agent(), to: ctx.light.id() });
            }
            for cond in &rule.conditions {
                let family = self.registry.family(cond)?;
                let params = coop_params(family, intention, ctx.state, ctx.agents, self.config);
                if !self.registry.evaluate(cond, &params)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Indices of the applicable rules in the individual's RS and RSint.
    pub fn valid_rules(&self, ctx: &EvalContext<'_>, individual: &Individual) -> SimResult<(Vec<usize>, Vec<usize>)> {
        let mut valid_rs = Vec::new();
        for (i, rule) in individual.rs().iter().enumerate() {
            if self.evaluate_individual(ctx, rule)? {
                valid_rs.push(i);
            }
        }
        let mut valid_rs_int = Vec::new();
        for (i, rule) in individual.rs_int().iter().enumerate() {
            if self.evaluate_cooperative(ctx, rule)? {
                valid_rs_int.push(i);
            }
        }
        Ok((valid_rs, valid_rs_int))
    }

    /// Position of the first user rule whose scanned conditions all hold.
    ///
    /// A rule whose every condition is excluded from the scan never applies.
    pub fn first_applicable_user_rule(&self, ctx: &EvalContext<'_>, rules: &[UserRule]) -> SimResult<Option<usize>> {
        'rules: for (i, rule) in rules.iter().enumerate() {
            let mut scanned = 0;
            for cond in rule.scanned_conditions() {
                scanned += 1;
                let params = ctx.state.params(self.registry.family(cond)?, self.config);
                if !self.registry.evaluate(cond, &params)? {
                    continue 'rules;
                }
            }
            if scanned > 0 {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}
