//! # Logging configuration
//!
//! Standardized `tracing` setup: structured logs filtered by `RUST_LOG`
//! (default `info`), with the scheduler's per-tick housekeeping kept at
//! `debug`/`trace` so `info`-level output stays meaningful in production.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vantage_manager::logging::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!("strategy runtime started");
//! }
//! ```
//!
//! JSON output for log aggregators: [`init_json_logging`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the span the execution scheduler opens on every tick; it logs at
/// `debug` already, this filter exists so a `RUST_LOG=info` run doesn't pick
/// up any `info`-level events nested inside it either.
pub const SCHEDULER_TICK_SPAN_NAME: &str = "scheduler_tick";

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(SchedulerNoiseFilter)
        .init()
}

pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .with(SchedulerNoiseFilter)
        .init()
}

struct SchedulerNoiseFilter;

impl<S> tracing_subscriber::layer::Layer<S> for SchedulerNoiseFilter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn event_enabled(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) -> bool {
        if *event.metadata().level() <= tracing::Level::INFO {
            return true;
        }
        match ctx.lookup_current() {
            Some(span) => span.name() != SCHEDULER_TICK_SPAN_NAME,
            None => true,
        }
    }
}
