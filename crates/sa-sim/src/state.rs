//! Intersection state extraction and predicate parameters.

use sa_agent::light::is_left_turn_lane;
use sa_agent::{AgentStore, TrafficLight, WaitSnapshot};
use sa_core::EngineConfig;
use sa_rules::{Intention, PredicateFamily, PredicateParams};

use crate::{SimResult, TrafficSimulator};

/// Which movement a stopped vehicle is queued for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Movement {
    /// `_S`: a through lane.
    Straight,
    /// `_L`: a left-turn lane (`LTL`).
    Left,
}

/// A vehicle stopped on one of the light's lanes.
#[derive(Clone, Debug, PartialEq)]
pub struct StoppedVehicle {
    pub id:                       String,
    pub lane:                     String,
    pub movement:                 Movement,
    pub waiting_time:             f64,
    pub accumulated_waiting_time: f64,
}

/// What one light sees at one instant, read once per reevaluation and
/// shared by every condition evaluated for it.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionState {
    pub time:          f64,
    pub phase:         u32,
    pub phase_name:    String,
    /// Seconds the running phase has been active.
    pub phase_elapsed: f64,
    pub stopped:       Vec<StoppedVehicle>,
}

impl IntersectionState {
    pub fn observe<S: TrafficSimulator + ?Sized>(sim: &S, light: &TrafficLight) -> SimResult<Self> {
        let name = light.name();
        let time = sim.time();
        let elapsed = sim.phase_duration(name)? - (sim.next_switch(name)? - time);

        let mut stopped = Vec::new();
        for id in sim.vehicle_ids() {
            let Some(v) = sim.vehicle(&id) else { continue };
            if v.speed != 0.0 || !light.controls_lane(&v.lane) {
                continue;
            }
            let movement = if is_left_turn_lane(&v.lane) { Movement::Left } else { Movement::Straight };
            stopped.push(StoppedVehicle {
                id:                       v.id,
                lane:                     v.lane,
                movement,
                waiting_time:             v.waiting_time,
                accumulated_waiting_time: v.accumulated_waiting_time,
            });
        }

        Ok(Self {
            time,
            phase: sim.phase(name)?,
            phase_name: sim.phase_name(name)?,
            phase_elapsed: elapsed,
            stopped,
        })
    }

    /// Stopped vehicles → accumulated waiting time.
    pub fn cars_waiting(&self) -> WaitSnapshot {
        self.stopped
            .iter()
            .map(|v| (v.id.clone(), v.accumulated_waiting_time))
            .collect()
    }

    /// Longest current wait among stopped vehicles of `movement`; 0 if none.
    pub fn longest_wait(&self, movement: Movement) -> f64 {
        self.stopped
            .iter()
            .filter(|v| v.movement == movement)
            .map(|v| v.waiting_time)
            .fold(0.0, f64::max)
    }

    /// Stopped vehicles of `movement` that have waited at all.
    pub fn count_waiting(&self, movement: Movement) -> usize {
        self.stopped
            .iter()
            .filter(|v| v.movement == movement && v.waiting_time > 0.0)
            .count()
    }

    /// Third `_` part of the phase name: `G`, `Y`, or empty.
    pub fn phase_state(&self) -> &str {
        self.phase_name.split('_').nth(2).unwrap_or("")
    }

    /// Parameters for a single-agent condition of `family`.
    pub fn params(&self, family: PredicateFamily, config: &EngineConfig) -> PredicateParams {
        use PredicateFamily as F;
        match family {
            F::LongestTimeWaitedToProceedStraight => PredicateParams::Scalar(self.longest_wait(Movement::Straight)),
            F::LongestTimeWaitedToTurnLeft => PredicateParams::Scalar(self.longest_wait(Movement::Left)),
            F::NumCarsWaitingToProceedStraight => {
                PredicateParams::Scalar(self.count_waiting(Movement::Straight) as f64)
            }
            F::NumCarsWaitingToTurnLeft => PredicateParams::Scalar(self.count_waiting(Movement::Left) as f64),
            F::TimeSpentInCurrentPhase => PredicateParams::Scalar(self.phase_elapsed),
            F::PhaseIs(_) => {
                PredicateParams::PhaseName(self.phase_name.split('_').map(str::to_owned).collect())
            }
            F::MaxGreenPhaseTimeReached => PredicateParams::PhaseTimer {
                state:   self.phase_state().to_owned(),
                elapsed: self.phase_elapsed,
                limit:   config.max_green_phase_time,
            },
            F::MaxYellowPhaseTimeReached => PredicateParams::PhaseTimer {
                state:   self.phase_state().to_owned(),
                elapsed: self.phase_elapsed,
                limit:   config.max_yellow_phase_time,
            },
            F::EmergencyVehicleApproaching
            | F::TimeSinceCommunication
            | F::IntendedActionIs
            | F::PeerIntent => PredicateParams::None,
        }
    }
}

/// Parameters for a cooperative condition of `family`, read from one
/// received intention.
///
/// Single-agent families fall back to the evaluating light's own state.
pub fn coop_params(
    family:    PredicateFamily,
    intention: &Intention,
    state:     &IntersectionState,
    agents:    &AgentStore,
    config:    &EngineConfig,
) -> PredicateParams {
    match family {
        PredicateFamily::TimeSinceCommunication => PredicateParams::Scalar(intention.age(state.time)),
        PredicateFamily::IntendedActionIs => PredicateParams::IntendedAction(intention.action()),
        PredicateFamily::PeerIntent => PredicateParams::PeerIntent {
            key:    format!("{}_{}", agents.name(intention.agent()), intention.action()),
            agent:  intention.agent(),
            action: intention.action(),
        },
        other => state.params(other, config),
    }
}

/// Summed waiting time over the light's edges.
pub fn intersection_wait_time<S: TrafficSimulator + ?Sized>(sim: &S, light: &TrafficLight) -> f64 {
    light.edges().iter().map(|e| sim.edge_waiting_time(e)).sum()
}
