//! Execution-layer error kinds.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("operation invalid in current state: {0}")]
    State(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("execution failed after {attempts} attempts: {reason}")]
    Execution { attempts: u32, reason: String },
}

impl From<std::io::Error> for ExecutionError {
    fn from(err: std::io::Error) -> Self {
        ExecutionError::Io(err.to_string())
    }
}
