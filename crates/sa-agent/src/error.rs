use thiserror::Error;

use sa_core::AgentId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("{from} is not a communication partner of {to}")]
    NotAPartner { from: AgentId, to: AgentId },

    #[error("agent {0} cannot partner with itself")]
    SelfPartner(AgentId),

    #[error("traffic light name `{0}` is used twice")]
    DuplicateName(String),

    #[error("traffic light `{0}` has no phases")]
    NoPhases(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
