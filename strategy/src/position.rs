//! Net position tracking and mark-to-market P&L.
//!
//! A strategy never sees raw fills as independent events — each incoming
//! [`OrderUpdate`](vantage_execution::OrderUpdate) carries a canonical
//! cumulative `filled_qty`, and [`crate::base::StrategyCore`] diffs that
//! against the last-seen snapshot to get an incremental fill quantity before
//! calling [`EstimatedPosition::apply_fill`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vantage_instrument::Side;

/// Net position in one instrument, tracked as separate long/short books so a
/// fill that flips the position books realized P&L on the closed side before
/// opening the new one.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedPosition {
    pub buy_qty: Decimal,
    pub sell_qty: Decimal,
    pub net_qty: Decimal,
    pub buy_avg_price: Decimal,
    pub sell_avg_price: Decimal,
    pub buy_total_qty: Decimal,
    pub sell_total_qty: Decimal,
    pub buy_total_value: Decimal,
    pub sell_total_value: Decimal,
    pub last_update: DateTime<Utc>,
}

impl EstimatedPosition {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            buy_qty: Decimal::ZERO,
            sell_qty: Decimal::ZERO,
            net_qty: Decimal::ZERO,
            buy_avg_price: Decimal::ZERO,
            sell_avg_price: Decimal::ZERO,
            buy_total_qty: Decimal::ZERO,
            sell_total_qty: Decimal::ZERO,
            buy_total_value: Decimal::ZERO,
            sell_total_value: Decimal::ZERO,
            last_update: now,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.net_qty.is_zero()
    }

    /// Applies an incremental fill of `qty` at `price` on `side`: closes any
    /// opposing open quantity first (realizing P&L on the closed portion),
    /// then opens or grows the same-side book with whatever remains.
    /// Returns the realized P&L delta from this fill.
    pub fn apply_fill(&mut self, side: Side, qty: Decimal, price: Decimal, now: DateTime<Utc>) -> Decimal {
        if qty.is_zero() || qty.is_sign_negative() {
            return Decimal::ZERO;
        }

        let original_qty = qty;
        let mut remaining = qty;
        let mut realized = Decimal::ZERO;

        match side {
            Side::Buy => {
                if self.net_qty < Decimal::ZERO {
                    let closing = remaining.min(self.sell_qty);
                    realized += (self.sell_avg_price - price) * closing;
                    self.sell_qty -= closing;
                    self.net_qty += closing;
                    remaining -= closing;
                    if self.sell_qty.is_zero() {
                        self.sell_avg_price = Decimal::ZERO;
                    }
                }
                if remaining > Decimal::ZERO {
                    let new_qty = self.buy_qty + remaining;
                    self.buy_avg_price = (self.buy_avg_price * self.buy_qty + price * remaining) / new_qty;
                    self.buy_qty = new_qty;
                    self.net_qty += remaining;
                }
                self.buy_total_qty += original_qty;
                self.buy_total_value += price * original_qty;
            }
            Side::Sell => {
                if self.net_qty > Decimal::ZERO {
                    let closing = remaining.min(self.buy_qty);
                    realized += (price - self.buy_avg_price) * closing;
                    self.buy_qty -= closing;
                    self.net_qty -= closing;
                    remaining -= closing;
                    if self.buy_qty.is_zero() {
                        self.buy_avg_price = Decimal::ZERO;
                    }
                }
                if remaining > Decimal::ZERO {
                    let new_qty = self.sell_qty + remaining;
                    self.sell_avg_price = (self.sell_avg_price * self.sell_qty + price * remaining) / new_qty;
                    self.sell_qty = new_qty;
                    self.net_qty -= remaining;
                }
                self.sell_total_qty += original_qty;
                self.sell_total_value += price * original_qty;
            }
        }

        self.last_update = now;
        realized
    }
}

/// Realized + unrealized P&L for one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pnl {
    pub realized: Decimal,
    pub unrealized: Decimal,
    pub fees: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Pnl {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            realized: Decimal::ZERO,
            unrealized: Decimal::ZERO,
            fees: Decimal::ZERO,
            timestamp: now,
        }
    }

    pub fn gross(&self) -> Decimal {
        self.realized + self.unrealized
    }

    pub fn net(&self) -> Decimal {
        self.gross() - self.fees
    }

    /// Recomputes `unrealized` by marking the open side of `position` to the
    /// current bid (if long) or ask (if short). Flat positions mark to zero.
    pub fn update_unrealized(&mut self, position: &EstimatedPosition, bid: Decimal, ask: Decimal, now: DateTime<Utc>) {
        self.unrealized = if position.net_qty > Decimal::ZERO {
            position.net_qty * (bid - position.buy_avg_price)
        } else if position.net_qty < Decimal::ZERO {
            position.net_qty.abs() * (position.sell_avg_price - ask)
        } else {
            Decimal::ZERO
        };
        self.timestamp = now;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn side_strategy() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Buy), Just(Side::Sell)]
    }

    fn fill_strategy() -> impl Strategy<Value = (Side, f64, f64)> {
        (side_strategy(), 1.0f64..500.0, 1.0f64..1000.0)
    }

    proptest! {
        /// Invariant 1 (position consistency) and 2 (average-price sanity)
        /// hold after every fill in an arbitrary sequence.
        #[test]
        fn position_and_average_price_invariants_hold(fills in prop::collection::vec(fill_strategy(), 1..50)) {
            let now = Utc::now();
            let mut pos = EstimatedPosition::new(now);

            for (side, qty, price) in fills {
                let qty = Decimal::try_from(qty).unwrap();
                let price = Decimal::try_from(price).unwrap();
                pos.apply_fill(side, qty, price, now);

                prop_assert!(pos.buy_qty >= Decimal::ZERO);
                prop_assert!(pos.sell_qty >= Decimal::ZERO);
                prop_assert_eq!(pos.net_qty, pos.buy_qty - pos.sell_qty);

                if pos.buy_qty > Decimal::ZERO {
                    prop_assert!(pos.buy_avg_price > Decimal::ZERO);
                } else {
                    prop_assert_eq!(pos.buy_avg_price, Decimal::ZERO);
                }

                if pos.sell_qty > Decimal::ZERO {
                    prop_assert!(pos.sell_avg_price > Decimal::ZERO);
                } else {
                    prop_assert_eq!(pos.sell_avg_price, Decimal::ZERO);
                }
            }
        }

        /// Invariant 3 (P&L additivity): for a sequence of round trips that
        /// end flat, the sum of realized P&L equals the analytic sum of
        /// (exit - entry) * qty over each closing fill, respecting sign.
        #[test]
        fn pnl_additivity_over_round_trips(
            entry_side in side_strategy(),
            entry_qty in 1.0f64..200.0,
            entry_price in 1.0f64..500.0,
            exit_price in 1.0f64..500.0,
        ) {
            let now = Utc::now();
            let mut pos = EstimatedPosition::new(now);

            let qty = Decimal::try_from(entry_qty).unwrap();
            let ep = Decimal::try_from(entry_price).unwrap();
            let xp = Decimal::try_from(exit_price).unwrap();

            pos.apply_fill(entry_side, qty, ep, now);
            let exit_side = if entry_side == Side::Buy { Side::Sell } else { Side::Buy };
            let realized = pos.apply_fill(exit_side, qty, xp, now);

            let expected = match entry_side {
                Side::Buy => (xp - ep) * qty,
                Side::Sell => (ep - xp) * qty,
            };

            prop_assert!(pos.is_flat());
            prop_assert_eq!(realized, expected);
        }
    }
}
