#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # Strategy — lifecycle, position, and run-state contract
//!
//! The [`BaseStrategy`] trait every concrete strategy in `vantage-strategies`
//! implements, plus the bookkeeping it shares: net position tracking
//! ([`position`]), the run-state machine ([`control`]), and the position
//! flattening helper ([`close_positions`]).

pub mod base;
pub mod close_positions;
pub mod control;
pub mod error;
pub mod position;

pub use base::{BaseStrategy, StrategyCore};
pub use close_positions::build_flatten_signal;
pub use control::{RunState, StrategyControlState};
pub use error::StrategyError;
pub use position::{EstimatedPosition, Pnl};
