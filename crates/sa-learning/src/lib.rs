//! `sa-learning` — rule-set individuals and the updates that improve them.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`individual`] | `Individual` — RS / RSint catalogs, fitness, run statistics      |
//! | [`pool`]       | `AgentPool`, `RunBindings` (agent → assigned individual)         |
//! | [`reinforce`]  | `WeightUpdate` trait, `TemporalDifference`, `CreditSignal`       |
//! | [`fitness`]    | `FitnessFunction` trait, `RunFitness`                            |
//! | [`evolve`]     | `GenerationStrategy` trait, `KeepGeneration`, `TruncationSelection` |
//! | [`error`]      | `LearningError`, `LearningResult<T>`                             |
//!
//! Two time scales meet here.  Within a run, the decision engine calls a
//! [`WeightUpdate`] after every learned decision and records a fitness
//! penalty on the assigned individual.  Between runs, the experiment loop
//! scores individuals with a [`FitnessFunction`], normalises fitness per
//! pool, and replaces each pool's population through a
//! [`GenerationStrategy`].  The engine never touches a pool's population
//! mid-run.

pub mod error;
pub mod evolve;
pub mod fitness;
pub mod individual;
pub mod pool;
pub mod reinforce;


pub use error::{LearningError, LearningResult};
pub use evolve::{GenerationStrategy, KeepGeneration, TruncationSelection};
pub use fitness::{FitnessFunction, RunFitness};
pub use individual::{FitnessPenalty, Individual};
pub use pool::{AgentPool, Binding, RunBindings};
pub use reinforce::{CreditSignal, TemporalDifference, WeightUpdate};
