use thiserror::Error;

use sa_core::{AgentId, PoolId, RuleId};
use sa_rules::RuleKind;

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("pool {0} not found")]
    UnknownPool(PoolId),

    #[error("pool {0} has no individuals")]
    EmptyPool(PoolId),

    #[error("pool {pool} has only {individuals} individuals for its member agents")]
    PoolExhausted { pool: PoolId, individuals: usize },

    #[error("pool {pool} has no individual at index {index}")]
    IndividualOutOfRange { pool: PoolId, index: usize },

    #[error("agent {0} has no individual bound for this run")]
    Unbound(AgentId),

    #[error("rule {rule} of kind {kind:?} placed in the {catalog:?} catalog")]
    WrongCatalog { rule: RuleId, kind: RuleKind, catalog: RuleKind },

    #[error("invalid learning parameter: {0}")]
    Parameter(String),
}

pub type LearningResult<T> = Result<T, LearningError>;
