//! Builds the [`TradingSignal`] that flattens a strategy's current position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vantage_execution::TradingSignal;
use vantage_instrument::Side;

use crate::position::EstimatedPosition;

/// Builds an aggressive (cross-the-spread) signal that closes `position`
/// entirely, or `None` if it is already flat. The returned signal trades the
/// opposite side of the open book, sized to the full open quantity.
pub fn build_flatten_signal(
    strategy_id: impl Into<String>,
    symbol: impl Into<String>,
    position: &EstimatedPosition,
    bid: Decimal,
    ask: Decimal,
    now: DateTime<Utc>,
) -> Option<TradingSignal> {
    if position.is_flat() {
        return None;
    }

    let (side, qty, price) = if position.net_qty > Decimal::ZERO {
        (Side::Sell, position.net_qty, bid)
    } else {
        (Side::Buy, position.net_qty.abs(), ask)
    };

    Some(
        TradingSignal::new(strategy_id, symbol, side, price, qty, side_signal(side), 1.0, now)
            .with_metadata("reason", "flatten"),
    )
}

fn side_signal(side: Side) -> f64 {
    match side {
        Side::Buy => 1.0,
        Side::Sell => -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn flat_position_produces_no_signal() {
        let position = EstimatedPosition::new(now());
        assert!(build_flatten_signal("s1", "ag_F_2_SFE", &position, dec!(99), dec!(101), now()).is_none());
    }

    #[test]
    fn long_position_is_closed_by_selling_at_bid() {
        let mut position = EstimatedPosition::new(now());
        position.apply_fill(Side::Buy, dec!(10), dec!(100), now());

        let signal = build_flatten_signal("s1", "ag_F_2_SFE", &position, dec!(99), dec!(101), now()).unwrap();
        assert_eq!(signal.side, Side::Sell);
        assert_eq!(signal.quantity, dec!(10));
        assert_eq!(signal.price, dec!(99));
    }

    #[test]
    fn short_position_is_closed_by_buying_at_ask() {
        let mut position = EstimatedPosition::new(now());
        position.apply_fill(Side::Sell, dec!(10), dec!(100), now());

        let signal = build_flatten_signal("s1", "ag_F_2_SFE", &position, dec!(99), dec!(101), now()).unwrap();
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.quantity, dec!(10));
        assert_eq!(signal.price, dec!(101));
    }
}
