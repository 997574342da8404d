//! "vantage" façade crate
//!
//! Single entry point re-exporting every crate in the vantage strategy
//! runtime, for users who prefer to depend on one crate rather than the
//! individual `vantage-*` workspace members.
//!
//! # Example
//! ```rust
//! use vantage::instrument::Side;
//! let _side = Side::Buy;
//! ```

// Re-export of internal crates with organized namespaces
pub use vantage_execution as execution;
pub use vantage_instrument as instrument;
pub use vantage_manager as manager;
pub use vantage_risk as risk;
pub use vantage_strategies as strategies;
pub use vantage_strategy as strategy;

// Flat re-export of very frequently used symbols
pub use vantage_instrument::{ExchangeId, Side};

/// Single import for the common runtime types: signals, position/run-state
/// bookkeeping, the `BaseStrategy` contract, and the manager registries.
pub mod prelude {
    pub use crate::execution::{MarketDataUpdate, OrderUpdate, TradingSignal};
    pub use crate::instrument::{ExchangeId, OrderStatus, Side};
    pub use crate::manager::{ManagerError, PortfolioManager, StrategyConfig, StrategyManager};
    pub use crate::strategies::{AggressiveStrategy, HedgingStrategy, PassiveStrategy};
    pub use crate::strategy::{BaseStrategy, EstimatedPosition, RunState, StrategyCore};
}
