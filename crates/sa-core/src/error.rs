//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where configuration problems can surface.

use thiserror::Error;

/// The base error type for `sa-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("probability {name} = {value} is outside [0, 1]")]
    Probability { name: &'static str, value: f64 },
}

/// Shorthand result type for `sa-core`.
pub type CoreResult<T> = Result<T, CoreError>;
