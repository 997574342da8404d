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
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Instrument
//!
//! Core traits and types for exchanges, instruments, sides and order-lifecycle
//! enums shared across the vantage workspace. No specific venue integration
//! lives here — just the value types everything else is keyed by.

/// Exchange/venue identifiers and capabilities.
pub mod exchange;

/// The immutable instrument (contract spec) type.
pub mod instrument;

/// Order lifecycle enums (`OrderStatus`, `OrderHitType`).
pub mod order;

/// Tick-size rounding and validation.
pub mod price;

/// Symbol -> contract-spec lookup.
pub mod registry;

/// Buy/Sell.
pub mod side;

pub use exchange::{Exchange, ExchangeId};
pub use instrument::{Instrument, InstrumentKind};
pub use order::{OrderHitType, OrderStatus};
pub use price::{PriceError, PriceMath};
pub use registry::{InstrumentRegistry, RegistryError};
pub use side::{OrderSide, Side};
