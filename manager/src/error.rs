//! Central error type aggregating the subsystems a [`crate::StrategyManager`]
//! or [`crate::PortfolioManager`] can fail against.

use thiserror::Error;
use vantage_strategy::StrategyError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("operation invalid in current state: {0}")]
    State(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("limit breached: {0}")]
    Limit(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}
