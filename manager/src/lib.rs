#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # Manager — strategy lifecycle and portfolio allocation
//!
//! Owns two registries built on the `vantage-strategy`/`vantage-strategies`
//! contracts: [`strategy_manager::StrategyManager`], which loads, activates,
//! and routes events to concrete strategies behind a dyn-safe facade, and
//! [`portfolio_manager::PortfolioManager`], which tracks each strategy's
//! capital allocation, rebalances, and can trigger a global flatten.
//!
//! ## Configuration
//!
//! Strategies are loaded from [`config::StrategyConfig`], a serde-tagged enum
//! mirroring the external parameter surface (plain floats/millisecond counts)
//! that gets cast into each strategy's own `Decimal`/`chrono::Duration`
//! typed config on construction.
//!
//! ## Errors
//!
//! All fallible operations here return [`error::ManagerError`], which
//! aggregates configuration, state, not-found, limit, I/O, and underlying
//! strategy errors behind one type.

/// Strategy configuration surface: serde DTOs and the cast into each
/// concrete strategy's typed config.
pub mod config;

/// Aggregated error type for strategy and portfolio management.
pub mod error;

/// Tracing initialisers, matching the rest of the workspace's logging setup.
pub mod logging;

/// Capital allocation, rebalance, correlation, and global flatten.
pub mod portfolio_manager;

/// Traits and types related to component shutdowns.
pub mod shutdown;

/// Strategy factory, registry, and lifecycle control.
pub mod strategy_manager;

pub use config::StrategyConfig;
pub use error::ManagerError;
pub use portfolio_manager::{PortfolioManager, StrategyAllocationSnapshot};
pub use strategy_manager::{ManagedStrategy, StrategyManager, StrategyStatus};
