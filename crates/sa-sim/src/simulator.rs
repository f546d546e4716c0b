//! The traffic simulator boundary and an in-process scripted simulator.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use sa_agent::light::edge_of;
use sa_core::SimRng;

use crate::{SimError, SimResult};

// ── Boundary ──────────────────────────────────────────────────────────────────

/// One vehicle as reported by the simulator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    pub id:    String,
    pub lane:  String,
    pub speed: f64,
    /// Seconds stopped since the vehicle last moved.
    pub waiting_time: f64,
    /// Seconds stopped over the whole trip.
    pub accumulated_waiting_time: f64,
}

/// Everything the decision engine reads from, and commands to, the traffic
/// simulator.
///
/// Implementations wrap an external engine (for example a SUMO TraCI
/// connection) or simulate traffic in process, like [`ScriptedSimulator`].
/// Lights are addressed by name.
pub trait TrafficSimulator {
    /// Simulated seconds since the start of the run.
    fn time(&self) -> f64;

    /// Advance one step.
    fn step(&mut self) -> SimResult<()>;

    /// Vehicles still in the network plus those yet to depart.
    fn min_expected_vehicles(&self) -> usize;

    fn vehicle_ids(&self) -> Vec<String>;

    fn vehicle(&self, id: &str) -> Option<VehicleState>;

    /// Summed waiting time of the vehicles on `edge`.
    fn edge_waiting_time(&self, edge: &str) -> f64;

    fn phase(&self, light: &str) -> SimResult<u32>;

    fn phase_name(&self, light: &str) -> SimResult<String>;

    /// Programmed duration of the running phase.
    fn phase_duration(&self, light: &str) -> SimResult<f64>;

    /// Time at which the running phase is due to switch.
    fn next_switch(&self, light: &str) -> SimResult<f64>;

    fn phase_count(&self, light: &str) -> SimResult<usize>;

    fn set_phase(&mut self, light: &str, phase: u32) -> SimResult<()>;
}

// ── ScriptedSimulator ─────────────────────────────────────────────────────────

/// A phase of a scripted light: name, programmed duration, and the lanes it
/// gives right of way to while green.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptedPhase {
    pub name:     String,
    pub duration: f64,
    pub serves:   Vec<String>,
}

impl ScriptedPhase {
    pub fn new<S: Into<String>>(
        name:     impl Into<String>,
        duration: f64,
        serves:   impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            duration,
            serves: serves.into_iter().map(Into::into).collect(),
        }
    }

    fn is_green(&self) -> bool {
        self.name.split('_').nth(2) == Some("G")
    }
}

/// A vehicle entering the network at `time` on `lane`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arrival {
    pub time: f64,
    pub id:   String,
    pub lane: String,
}

/// A phase command received by the simulator.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseCommand {
    pub time:  f64,
    pub light: String,
    pub phase: u32,
}

struct ScriptedLight {
    phases:  Vec<ScriptedPhase>,
    current: usize,
    started: f64,
}

impl ScriptedLight {
    fn running(&self) -> &ScriptedPhase {
        &self.phases[self.current]
    }
}

struct Vehicle {
    lane:        String,
    approaching: u32,
    waiting:     f64,
    accumulated: f64,
}

/// Queue-based intersection model stepped one second at a time.
///
/// Vehicles enter on a lane, approach for a few steps, then stop at the
/// line.  While a green phase serves a lane, the vehicle at its head leaves
/// the network, one per lane per step.  Phases advance on their own when
/// their duration runs out, as in a fixed-time controller, unless the engine
/// switches them first.
pub struct ScriptedSimulator {
    time:           f64,
    approach_steps: u32,
    lights:         BTreeMap<String, ScriptedLight>,
    pending:        VecDeque<Arrival>,
    vehicles:       BTreeMap<String, Vehicle>,
    queues:         BTreeMap<String, VecDeque<String>>,
    departed:       usize,
    commands:       Vec<PhaseCommand>,
}

impl Default for ScriptedSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSimulator {
    pub fn new() -> Self {
        Self {
            time:           0.0,
            approach_steps: 2,
            lights:         BTreeMap::new(),
            pending:        VecDeque::new(),
            vehicles:       BTreeMap::new(),
            queues:         BTreeMap::new(),
            departed:       0,
            commands:       Vec::new(),
        }
    }

    /// Steps a new vehicle spends moving before it joins the stopped queue.
    pub fn approach_steps(&mut self, steps: u32) -> &mut Self {
        self.approach_steps = steps;
        self
    }

    pub fn add_light(&mut self, name: impl Into<String>, phases: Vec<ScriptedPhase>) -> SimResult<&mut Self> {
        let name = name.into();
        if phases.is_empty() {
            return Err(SimError::Config(format!("scripted light `{name}` has no phases")));
        }
        self.lights.insert(name, ScriptedLight { phases, current: 0, started: self.time });
        Ok(self)
    }

    /// Queue an arrival; arrivals are released in time order.
    pub fn schedule(&mut self, arrival: Arrival) -> &mut Self {
        let at = self.pending.partition_point(|a| a.time <= arrival.time);
        self.pending.insert(at, arrival);
        self
    }

    /// Bernoulli demand: on every whole second before `until`, each lane
    /// receives a vehicle with probability `probability`.
    pub fn random_demand(&mut self, rng: &mut SimRng, lanes: &[&str], probability: f64, until: f64) -> &mut Self {
        let mut n = self.pending.len() + self.vehicles.len();
        let mut t = 1.0;
        while t < until {
            for lane in lanes {
                if rng.gen_bool(probability) {
                    self.schedule(Arrival { time: t, id: format!("veh{n}"), lane: (*lane).to_owned() });
                    n += 1;
                }
            }
            t += 1.0;
        }
        self
    }

    /// Put a vehicle at the stop line right now, already stopped for
    /// `waited` seconds.
    pub fn place_stopped(&mut self, id: impl Into<String>, lane: impl Into<String>, waited: f64) -> &mut Self {
        let (id, lane) = (id.into(), lane.into());
        self.queues.entry(lane.clone()).or_default().push_back(id.clone());
        self.vehicles.insert(id, Vehicle { lane, approaching: 0, waiting: waited, accumulated: waited });
        self
    }

    /// Vehicles that have left the network.
    pub fn departed(&self) -> usize {
        self.departed
    }

    /// Every phase command received, in order.
    pub fn commands(&self) -> &[PhaseCommand] {
        &self.commands
    }

    fn light(&self, name: &str) -> SimResult<&ScriptedLight> {
        self.lights.get(name).ok_or_else(|| SimError::UnknownLight(name.to_owned()))
    }

    fn lane_has_green(&self, lane: &str) -> bool {
        self.lights.values().any(|l| {
            let p = l.running();
            p.is_green() && p.serves.iter().any(|s| s == lane)
        })
    }
}

impl TrafficSimulator for ScriptedSimulator {
    fn time(&self) -> f64 {
        self.time
    }

    fn step(&mut self) -> SimResult<()> {
        self.time += 1.0;
        let now = self.time;

        for light in self.lights.values_mut() {
            if now >= light.started + light.running().duration {
                light.current = (light.current + 1) % light.phases.len();
                light.started = now;
            }
        }

        let lanes: Vec<String> = self.queues.keys().cloned().collect();
        for lane in lanes {
            if !self.lane_has_green(&lane) {
                continue;
            }
            let Some(queue) = self.queues.get_mut(&lane) else { continue };
            let at_line = queue
                .front()
                .and_then(|id| self.vehicles.get(id))
                .is_some_and(|v| v.approaching == 0);
            if at_line {
                if let Some(id) = queue.pop_front() {
                    self.vehicles.remove(&id);
                    self.departed += 1;
                    trace!(vehicle = %id, %lane, time = now, "vehicle departed");
                }
            }
        }

        for v in self.vehicles.values_mut() {
            if v.approaching > 0 {
                v.approaching -= 1;
            } else {
                v.waiting += 1.0;
                v.accumulated += 1.0;
            }
        }

        while self.pending.front().is_some_and(|a| a.time <= now) {
            let Some(a) = self.pending.pop_front() else { break };
            self.queues.entry(a.lane.clone()).or_default().push_back(a.id.clone());
            self.vehicles.insert(
                a.id,
                Vehicle { lane: a.lane, approaching: self.approach_steps, waiting: 0.0, accumulated: 0.0 },
            );
        }
        Ok(())
    }

    fn min_expected_vehicles(&self) -> usize {
        self.pending.len() + self.vehicles.len()
    }

    fn vehicle_ids(&self) -> Vec<String> {
        self.vehicles.keys().cloned().collect()
    }

    fn vehicle(&self, id: &str) -> Option<VehicleState> {
        self.vehicles.get(id).map(|v| VehicleState {
            id:    id.to_owned(),
            lane:  v.lane.clone(),
            speed: if v.approaching > 0 { 10.0 } else { 0.0 },
            waiting_time:             v.waiting,
            accumulated_waiting_time: v.accumulated,
        })
    }

    fn edge_waiting_time(&self, edge: &str) -> f64 {
        self.vehicles
            .values()
            .filter(|v| edge_of(&v.lane) == edge)
            .map(|v| v.waiting)
            .sum()
    }

    fn phase(&self, light: &str) -> SimResult<u32> {
        Ok(self.light(light)?.current as u32)
    }

    fn phase_name(&self, light: &str) -> SimResult<String> {
        Ok(self.light(light)?.running().name.clone())
    }

    fn phase_duration(&self, light: &str) -> SimResult<f64> {
        Ok(self.light(light)?.running().duration)
    }

    fn next_switch(&self, light: &str) -> SimResult<f64> {
        let l = self.light(light)?;
        Ok(l.started + l.running().duration)
    }

    fn phase_count(&self, light: &str) -> SimResult<usize> {
        Ok(self.light(light)?.phases.len())
    }

    fn set_phase(&mut self, light: &str, phase: u32) -> SimResult<()> {
        let now = self.time;
        let l = self
            .lights
            .get_mut(light)
            .ok_or_else(|| SimError::UnknownLight(light.to_owned()))?;
        if phase as usize >= l.phases.len() {
            return Err(SimError::PhaseOutOfRange { light: light.to_owned(), phase });
        }
        l.current = phase as usize;
        l.started = now;
        self.commands.push(PhaseCommand { time: now, light: light.to_owned(), phase });
        Ok(())
    }
}
