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
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Strategies — concrete implementations of [`vantage_strategy::BaseStrategy`]
//!
//! - [`aggressive::AggressiveStrategy`] — trend/momentum following.
//! - [`passive::PassiveStrategy`] — inventory-skewed market making.
//! - [`hedging::HedgingStrategy`] — delta-neutral primary/hedge pairing.

pub mod aggressive;
pub mod hedging;
pub mod passive;
pub mod shared;

pub use aggressive::{AggressiveConfig, AggressiveStrategy};
pub use hedging::{HedgingConfig, HedgingStrategy};
pub use passive::{PassiveConfig, PassiveStrategy};
