use sa_agent::AgentError;
use sa_core::{AgentId, CoreError};
use sa_learning::LearningError;
use sa_rules::{RuleError, RuleRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("engine configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Learning(#[from] LearningError),

    #[error("simulator has no traffic light named `{0}`")]
    UnknownLight(String),

    #[error("traffic light `{light}` has no phase {phase}")]
    PhaseOutOfRange { light: String, phase: u32 },

    #[error("{to} holds an intention from {from}, which is not one of its partners")]
    ForeignIntention { from: AgentId, to: AgentId },

    #[error("{agent} refers to a rule its individual does not have: {rule:?}")]
    MissingRule { agent: AgentId, rule: RuleRef },

    #[error("simulator error: {0}")]
    Simulator(String),
}

pub type SimResult<T> = Result<T, SimError>;
