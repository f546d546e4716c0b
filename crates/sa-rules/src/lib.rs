//! `sa-rules` — rules, intentions, and predicate dispatch.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`rule`]      | `Action`, `RuleKind`, `Rule`, `RuleRef`                        |
//! | [`user`]      | `UserRule`, `UserAction` — hand-coded safety rules             |
//! | [`intention`] | `Intention` — an announced next action                         |
//! | [`family`]    | `PredicateFamily`, `PhaseAxis` — what parameters a condition needs |
//! | [`predicate`] | `PredicateParams`, `PredicateFn`, `PredicateRegistry`          |
//! | [`library`]   | Standard predicate constructors (thresholds, phase checks, …)  |
//! | [`error`]     | `RuleError`, `RuleResult<T>`                                   |
//!
//! # Design notes
//!
//! A rule's conditions are plain identifier strings, as produced by the
//! genome layer.  Each identifier is bound once, at startup, to a typed
//! predicate function in a [`PredicateRegistry`]; the registry also records
//! the identifier's [`PredicateFamily`], which tells the engine which
//! parameters to extract from simulator state.  Validating every catalog
//! against the registry before the first tick turns an unknown identifier
//! into a setup error instead of a mid-run failure.

pub mod error;
pub mod family;
pub mod intention;
pub mod library;
pub mod predicate;
pub mod rule;
pub mod user;

#[cfg(test)]
mod tests;

pub use error::{RuleError, RuleResult};
pub use family::{PhaseAxis, PredicateFamily};
pub use intention::Intention;
pub use library::Comparison;
pub use predicate::{PredicateFn, PredicateParams, PredicateRegistry};
pub use rule::{Action, Rule, RuleKind, RuleRef};
pub use user::{UserAction, UserRule};
