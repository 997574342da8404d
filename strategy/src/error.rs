//! Strategy-layer error kinds.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("operation invalid in current state: {0}")]
    State(String),

    #[error("not found: {0}")]
    NotFound(String),
}
