//! External interface envelopes: market data and order updates flowing in,
//! trading signals flowing out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vantage_instrument::{OrderSide, OrderStatus};

/// A top-of-book-and-beyond market data snapshot for one symbol.
///
/// Arrays are sorted best-first. An empty `bid_price`/`ask_price` means that
/// side of the book is unknown; strategies must handle that gracefully
/// rather than indexing blindly into `[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataUpdate {
    pub symbol: String,
    pub venue: String,
    pub timestamp: DateTime<Utc>,
    pub bid_price: Vec<Decimal>,
    pub bid_qty: Vec<Decimal>,
    pub ask_price: Vec<Decimal>,
    pub ask_qty: Vec<Decimal>,
    pub last_price: Decimal,
    pub total_volume: Decimal,
    pub turnover: Decimal,
}

impl MarketDataUpdate {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bid_price.first().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.ask_price.first().copied()
    }

    /// Midpoint of the best bid/ask, if both sides are known.
    pub fn mid(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

/// An update to a previously-placed order. `strategy_id` routes this event
/// to exactly one strategy; a recipient whose id does not match must drop it
/// silently rather than attempt to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order_id: u64,
    pub client_order_id: String,
    pub strategy_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub avg_price: Decimal,
    pub quantity: Decimal,
    /// Canonical cumulative filled quantity as of this update — the
    /// authoritative snapshot a recipient recomputes position from, rather
    /// than a per-message fill delta (see crate-level idempotency note).
    pub filled_qty: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl OrderUpdate {
    /// Identity used to deduplicate redelivered, otherwise-identical updates.
    pub fn dedupe_key(&self) -> (u64, OrderStatus, Decimal) {
        (self.order_id, self.status, self.filled_qty)
    }
}

/// A strategy's intent to trade, emitted for an external router to act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub strategy_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub signal: f64,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

impl TradingSignal {
    pub fn new(
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        price: Decimal,
        quantity: Decimal,
        signal: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            side,
            price,
            quantity,
            signal: signal.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            timestamp,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn md(bids: Vec<Decimal>, asks: Vec<Decimal>) -> MarketDataUpdate {
        MarketDataUpdate {
            symbol: "ag_F_2_SFE".into(),
            venue: "B3".into(),
            timestamp: Utc::now(),
            bid_price: bids,
            bid_qty: vec![],
            ask_price: asks,
            ask_qty: vec![],
            last_price: dec!(100),
            total_volume: dec!(0),
            turnover: dec!(0),
        }
    }

    #[test]
    fn mid_and_spread_with_both_sides_known() {
        let update = md(vec![dec!(99.5)], vec![dec!(100.5)]);
        assert_eq!(update.mid(), Some(dec!(100.0)));
        assert_eq!(update.spread(), Some(dec!(1.0)));
    }

    #[test]
    fn mid_is_none_when_one_side_unknown() {
        let update = md(vec![], vec![dec!(100.5)]);
        assert_eq!(update.mid(), None);
        assert_eq!(update.spread(), None);
    }

    #[test]
    fn signal_clamps_out_of_range_inputs() {
        let signal = TradingSignal::new(
            "s1",
            "ag_F_2_SFE",
            OrderSide::Buy,
            dec!(100),
            dec!(10),
            5.0,
            -1.0,
            Utc::now(),
        );
        assert_eq!(signal.signal, 1.0);
        assert_eq!(signal.confidence, 0.0);
    }
}
