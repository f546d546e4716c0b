//! `sa-core` — foundational types for the shout-ahead signal control framework.
//!
//! This crate is a dependency of every other `sa-*` crate.  It has no `sa-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `PoolId`, `IndividualId`, `RuleId`, `Turn`      |
//! | [`time`]        | `Tick`, `SimClock`                                         |
//! | [`config`]      | `EngineConfig`, `IntentionRetention`, `GenerationSchedule` |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)                  |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Needed to load `EngineConfig` from a file.                 |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EngineConfig, GenerationSchedule, IntentionRetention};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, IndividualId, PoolId, RuleId, Turn};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
