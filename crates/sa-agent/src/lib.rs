//! `sa-agent` — traffic light agents and the intention protocol between them.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`light`]   | `TrafficLight`, `Phase`, `AppliedRule`, `WaitSnapshot`        |
//! | [`inbox`]   | `IntentionInbox` — received intentions keyed by turn          |
//! | [`store`]   | `AgentStore` (all lights, broadcast), `AgentRngs`             |
//! | [`builder`] | `AgentStoreBuilder` (lights + partner graph)                  |
//! | [`error`]   | `AgentError`, `AgentResult<T>`                                |
//!
//! # Intention delivery
//!
//! An agent never holds references to its partners.  Broadcasting goes
//! through [`AgentStore::broadcast`], which records the intention in the
//! sender's outbound table and appends it to each partner's inbox in one
//! synchronous call.  The engine visits agents in `AgentId` order, so a
//! broadcast is visible to partners visited later in the same tick and to
//! earlier ones only on the next tick.

pub mod builder;
pub mod error;
pub mod inbox;
pub mod light;
pub mod store;


pub use builder::AgentStoreBuilder;
pub use error::{AgentError, AgentResult};
pub use inbox::IntentionInbox;
pub use light::{AppliedRule, Phase, TrafficLight, WaitSnapshot};
pub use store::{AgentRngs, AgentStore};
