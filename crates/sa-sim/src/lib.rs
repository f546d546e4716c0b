//! `sa-sim` — decision engine and generation loop for the shout-ahead
//! signal control framework.
//!
//! # Reevaluation round
//!
//! ```text
//! for each light, in AgentId order:
//!   ① Observe   — stopped vehicles, phase and phase timer from the simulator.
//!   ② User      — the first applicable user rule wins outright.
//!   ③ Select    — roulette over the applicable RS rules; the chosen rule's
//!                 action is broadcast to the light's partners as an
//!                 intention for this turn.
//!   ④ Resolve   — roulette over the applicable RSint rules; an RSint rule
//!                 at least as heavy as the RS rule wins, a lighter one wins
//!                 with probability pCoop.
//!   ⑤ Credit    — the outgoing learned rule is reweighted from the
//!                 throughput since the previous round.
//!   ⑥ Apply     — the resolved rule's phase is sent to the simulator.
//! ```
//!
//! # Modules
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`simulator`]   | `TrafficSimulator` boundary, `ScriptedSimulator`          |
//! | [`state`]       | `IntersectionState` extraction, predicate parameters      |
//! | [`evaluator`]   | `RuleEvaluator`: individual, cooperative and user rules   |
//! | [`credit`]      | Throughput and wait-time signals                          |
//! | [`engine`]      | `DecisionEngine`, tie-break, user rule transforms         |
//! | [`builder`]     | `EngineBuilder`                                           |
//! | [`experiment`]  | `Experiment`: the generation loop                         |
//! | [`observer`]    | `EngineObserver` callbacks                                |
//! | [`report`]      | Decision and weight-update records, `RunReport`           |
//!
//! # Cargo features
//!
//! | Feature | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Serde derives on records and reports, forwarded to deps.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sa_sim::{EngineBuilder, NoopObserver};
//!
//! let mut engine = EngineBuilder::new(config, agents, pools).build()?;
//! let report = engine.run(&mut simulator, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod credit;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod experiment;
pub mod observer;
pub mod report;
pub mod simulator;
pub mod state;


pub use builder::EngineBuilder;
pub use credit::CreditAssessment;
pub use engine::{advance_target, resolve_cooperation, yellow_target, DecisionEngine, Resolution};
pub use error::{SimError, SimResult};
pub use evaluator::{EvalContext, RuleEvaluator};
pub use experiment::{Experiment, ExperimentReport, PoolChampion};
pub use observer::{EngineObserver, NoopObserver};
pub use report::{DecisionCounts, DecisionRecord, DecisionSource, RunReport, WeightUpdateRecord};
pub use simulator::{Arrival, PhaseCommand, ScriptedPhase, ScriptedSimulator, TrafficSimulator, VehicleState};
pub use state::{IntersectionState, Movement, StoppedVehicle};
