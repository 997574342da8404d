//! Running volume-weighted average price over a set of recorded trades.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Trade {
    price: Decimal,
    volume: Decimal,
    #[allow(dead_code)]
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Totals {
    total_volume: Decimal,
    total_value: Decimal,
}

/// Thread-safe, append-only accumulator of `(price, volume, timestamp)`
/// trades, deriving VWAP and deviation-from-target statistics.
#[derive(Debug, Default)]
pub struct VwapTracker {
    totals: Mutex<Totals>,
}

impl VwapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(&self, price: Decimal, volume: Decimal, _timestamp: DateTime<Utc>) {
        let mut totals = self.totals.lock();
        totals.total_volume += volume;
        totals.total_value += price * volume;
    }

    /// `Σpᵢvᵢ / Σvᵢ`, or 0 if no volume has been recorded yet.
    pub fn vwap(&self) -> Decimal {
        let totals = self.totals.lock();
        if totals.total_volume.is_zero() {
            Decimal::ZERO
        } else {
            totals.total_value / totals.total_volume
        }
    }

    pub fn total_volume(&self) -> Decimal {
        self.totals.lock().total_volume
    }

    pub fn deviation_from(&self, target: Decimal) -> (Decimal, Decimal) {
        let vwap = self.vwap();
        let absolute = vwap - target;
        let percent = if target.is_zero() {
            Decimal::ZERO
        } else {
            absolute / target * Decimal::from(100)
        };
        (absolute, percent)
    }

    pub fn reset(&self) {
        let mut totals = self.totals.lock();
        *totals = Totals::default();
    }
}
