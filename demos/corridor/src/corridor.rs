//! A three-intersection arterial: lights `A`, `B`, `C` in a row, each a
//! four-way junction with two phases and their yellows.
//!
//! ```text
//!        |        |        |
//!   ---- A ------ B ------ C ----
//!        |        |        |
//! ```

use anyhow::Result;

use sa_agent::{AgentStore, AgentStoreBuilder, Phase};
use sa_core::{AgentId, IndividualId, IntentionRetention, PoolId, RuleId, SimRng};
use sa_learning::{AgentPool, Individual};
use sa_rules::{Action, Comparison, PredicateRegistry, Rule};
use sa_sim::{ScriptedPhase, ScriptedSimulator, SimResult};

use crate::config::{DemandConfig, PoolConfig};

pub const LIGHTS: [&str; 3] = ["A", "B", "C"];

const PHASES: [&str; 4] = ["NS_S_G", "NS_S_Y", "EW_S_G", "EW_S_Y"];
const GREEN_SECS:  f64 = 30.0;
const YELLOW_SECS: f64 = 4.0;

/// Phases a learned rule may command: the two greens, or nothing.
const ACTIONS: [Action; 3] = [Action::Phase(0), Action::Phase(2), Action::DoNothing];

fn ns_lanes(light: &str) -> Vec<String> {
    vec![format!("{light}N_0"), format!("{light}S_0"), format!("{light}N_LTL_0")]
}

fn ew_lanes(light: &str) -> Vec<String> {
    vec![format!("{light}E_0"), format!("{light}W_0"), format!("{light}E_LTL_0")]
}

pub fn lanes(light: &str) -> Vec<String> {
    let mut all = ns_lanes(light);
    all.extend(ew_lanes(light));
    all
}

// ── Agents ────────────────────────────────────────────────────────────────────

/// Build the lights and link neighbours as communication partners.
pub fn build_store(seed: u64, retention: IntentionRetention) -> Result<(AgentStore, Vec<AgentId>)> {
    let mut builder = AgentStoreBuilder::new(seed);
    builder.retention(retention);
    let ids: Vec<AgentId> = LIGHTS
        .iter()
        .map(|&name| builder.add_light(name, lanes(name), PHASES.into_iter().map(Phase::new)))
        .collect();
    for pair in ids.windows(2) {
        builder.link(pair[0], pair[1]);
    }
    let (store, _) = builder.build()?;
    Ok((store, ids))
}

// ── Conditions ────────────────────────────────────────────────────────────────

/// The predicate registry plus the condition ids generated rules draw from.
pub struct ConditionCatalog {
    pub registry:    PredicateRegistry,
    pub individual:  Vec<String>,
    pub cooperative: Vec<String>,
}

pub fn build_catalog() -> Result<ConditionCatalog> {
    let mut registry = PredicateRegistry::standard();
    let mut individual = Vec::new();
    let mut cooperative = Vec::new();

    let thresholds: [(&str, &[f64]); 5] = [
        ("numCarsWaitingToProceedStraight", &[0.0, 2.0, 5.0]),
        ("numCarsWaitingToTurnLeft", &[0.0, 2.0]),
        ("longestTimeWaitedToProceedStraight", &[10.0, 30.0]),
        ("longestTimeWaitedToTurnLeft", &[10.0, 30.0]),
        ("timeSpentInCurrentPhase", &[10.0, 30.0]),
    ];
    for (family, values) in thresholds {
        for &v in values {
            let gt = format!("{family}_gt{v}");
            registry.register_threshold(gt.clone(), Comparison::Gt, v)?;
            individual.push(gt);
        }
    }
    let le = "numCarsWaitingToProceedStraight_le0".to_owned();
    registry.register_threshold(le.clone(), Comparison::Le, 0.0)?;
    individual.push(le);

    for (id, part) in [("verticalPhaseIs_NS", "NS"), ("horizontalPhaseIs_EW", "EW")] {
        registry.register_phase_is(id, part)?;
        individual.push(id.to_owned());
    }

    for v in [5.0, 15.0] {
        let lt = format!("timeSinceCommunication_lt{v}");
        registry.register_threshold(lt.clone(), Comparison::Lt, v)?;
        cooperative.push(lt);
    }
    for action in ACTIONS {
        let id = format!("intendedActionIs_{action}");
        registry.register_intended_action(id.clone(), action)?;
        cooperative.push(id);
    }
    for light in LIGHTS {
        for action in [Action::Phase(0), Action::Phase(2)] {
            cooperative.push(registry.register_peer_intent(light, action)?);
        }
    }

    Ok(ConditionCatalog { registry, individual, cooperative })
}

// ── Populations ───────────────────────────────────────────────────────────────

fn random_conditions(pool: &[String], max: usize, rng: &mut SimRng) -> Vec<String> {
    let n = rng.gen_range(1..=max.max(1));
    let mut picked: Vec<String> = Vec::with_capacity(n);
    for _ in 0..n {
        if let Some(c) = rng.choose(pool) {
            if !picked.contains(c) {
                picked.push(c.clone());
            }
        }
    }
    picked
}

fn random_individual(
    id:      IndividualId,
    catalog: &ConditionCatalog,
    config:  &PoolConfig,
    rng:     &mut SimRng,
) -> Result<Individual> {
    let mut next_rule = 0u32;
    let mut rule = |conditions: Vec<String>, rng: &mut SimRng, coop: bool| {
        let action = *rng.choose(&ACTIONS).unwrap_or(&Action::DoNothing);
        let weight = rng.gen_range(0.0..1.0);
        let id = RuleId(next_rule);
        next_rule += 1;
        if coop {
            Rule::cooperative(id, conditions, action, weight)
        } else {
            Rule::individual(id, conditions, action, weight)
        }
    };

    let mut rs = Vec::with_capacity(config.rs_rules);
    for _ in 0..config.rs_rules {
        let conditions = random_conditions(&catalog.individual, config.max_conditions, rng);
        rs.push(rule(conditions, rng, false));
    }
    let mut rs_int = Vec::with_capacity(config.rs_int_rules);
    for _ in 0..config.rs_int_rules {
        let conditions = random_conditions(&catalog.cooperative, config.max_conditions, rng);
        rs_int.push(rule(conditions, rng, true));
    }
    Ok(Individual::new(id, rs, rs_int)?)
}

/// One pool per light, each seeded with random individuals.
pub fn build_pools(
    lights:  &[AgentId],
    catalog: &ConditionCatalog,
    config:  &PoolConfig,
    rng:     &mut SimRng,
) -> Result<Vec<AgentPool>> {
    let mut pools = Vec::with_capacity(lights.len());
    for (i, &light) in lights.iter().enumerate() {
        let individuals = (0..config.individuals)
            .map(|n| random_individual(IndividualId(n as u32), catalog, config, rng))
            .collect::<Result<Vec<_>>>()?;
        let mut pool = AgentPool::new(PoolId(i as u32), individuals)?;
        pool.add_agent(light);
        pools.push(pool);
    }
    Ok(pools)
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// A fresh scripted corridor for one run.  Demand is reseeded per run so
/// successive runs see different traffic.
pub fn build_simulator(demand: &DemandConfig, seed: u64, run: u64) -> SimResult<ScriptedSimulator> {
    let mut sim = ScriptedSimulator::new();
    let mut all_lanes = Vec::new();
    for light in LIGHTS {
        let phases = vec![
            ScriptedPhase::new(PHASES[0], GREEN_SECS, ns_lanes(light)),
            ScriptedPhase::new(PHASES[1], YELLOW_SECS, Vec::<String>::new()),
            ScriptedPhase::new(PHASES[2], GREEN_SECS, ew_lanes(light)),
            ScriptedPhase::new(PHASES[3], YELLOW_SECS, Vec::<String>::new()),
        ];
        sim.add_light(light, phases)?;
        all_lanes.extend(lanes(light));
    }
    let lane_refs: Vec<&str> = all_lanes.iter().map(String::as_str).collect();
    let mut rng = SimRng::new(seed).child(run + 1);
    sim.random_demand(&mut rng, &lane_refs, demand.probability, demand.until);
    Ok(sim)
}
