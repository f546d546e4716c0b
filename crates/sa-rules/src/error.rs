use thiserror::Error;

use crate::{PredicateFamily, RuleKind};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown predicate `{0}`")]
    UnknownPredicate(String),

    #[error("predicate `{0}` is registered twice")]
    DuplicatePredicate(String),

    #[error("predicate `{id}` ({family:?}) cannot be used in a {kind:?} rule")]
    FamilyMismatch {
        id:     String,
        family: PredicateFamily,
        kind:   RuleKind,
    },

    #[error("user rule has no conditions")]
    EmptyUserRule,
}

pub type RuleResult<T> = Result<T, RuleError>;
