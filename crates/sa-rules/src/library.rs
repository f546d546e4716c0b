//! Standard predicate constructors.
//!
//! Each constructor returns a [`PredicateFn`] that is `false` for any
//! parameter variant it does not understand.

use std::sync::Arc;

use crate::{Action, PredicateFn, PredicateParams};

/// Scalar comparison used by threshold predicates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    #[inline]
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
        }
    }
}

pub fn threshold(cmp: Comparison, value: f64) -> PredicateFn {
    Arc::new(move |p| match p {
        PredicateParams::Scalar(x) => cmp.holds(*x, value),
        _ => false,
    })
}

pub fn phase_is(part: String) -> PredicateFn {
    Arc::new(move |p| match p {
        PredicateParams::PhaseName(parts) => parts.iter().any(|s| *s == part),
        _ => false,
    })
}

/// True when the phase is in `state` (`G`/`Y`) and has run at least its limit.
pub fn phase_time_reached(state: &'static str) -> PredicateFn {
    Arc::new(move |p| match p {
        PredicateParams::PhaseTimer { state: s, elapsed, limit } => s == state && elapsed >= limit,
        _ => false,
    })
}

pub fn intended_action_is(action: Action) -> PredicateFn {
    Arc::new(move |p| match p {
        PredicateParams::IntendedAction(a) => *a == action,
        _ => false,
    })
}

pub fn peer_intends(key: String) -> PredicateFn {
    Arc::new(move |p| match p {
        PredicateParams::PeerIntent { key: k, .. } => *k == key,
        _ => false,
    })
}
