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

//! # ⚡ Execution - Order Execution Core
//!
//! Order state tracking (`OrderStats`, `OrderPriceMap`), the external event
//! envelopes that cross the boundary with market data feeds and the order
//! router (`MarketDataUpdate`, `OrderUpdate`, `TradingSignal`), daily-init
//! persisted state, and the slicing/scheduling/VWAP machinery that turns one
//! parent order into a sequence of scheduled, tracked child fills.
//!
//! ## Main components
//!
//! - [`OrderStats`] / [`OrderPriceMap`]: per-order state and its dual
//!   price/id index.
//! - [`OrderSlicer`]: time- or volume-weighted decomposition of a parent
//!   order into [`OrderSlice`]s.
//! - [`VwapTracker`]: running VWAP and deviation statistics over recorded
//!   trades.
//! - [`ExecutionScheduler`]: ticks ready slices out to an execution
//!   callback, with bounded retry.
//! - [`VwapStrategy`]: composes the three into one single-shot execution
//!   algorithm.
//! - [`dailyinit`]: advisory-locked persistence of per-strategy overnight
//!   state.

pub mod dailyinit;
pub mod error;
pub mod events;
pub mod order_price_map;
pub mod order_stats;
pub mod scheduler;
pub mod slicer;
pub mod vwap;
pub mod vwap_strategy;

pub use dailyinit::DailyInitRecord;
pub use error::ExecutionError;
pub use events::{MarketDataUpdate, OrderUpdate, TradingSignal};
pub use order_price_map::{OrderPriceMap, OrderPriceMapError};
pub use order_stats::{OrderStats, QueuePosition};
pub use scheduler::{ExecuteCallback, ExecuteFuture, ExecutionScheduler, SchedulerStats};
pub use slicer::{OrderSlice, OrderSlicer, SliceStatus, SlicerError};
pub use vwap::VwapTracker;
pub use vwap_strategy::{SliceMethod, VwapStatus, VwapStrategy};
