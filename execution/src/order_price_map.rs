//! Dual price/id index over live orders for one instrument.
//!
//! Grounded on the teacher's `ExecutionInstrumentMap` (`map.rs`) dual-index
//! idiom — an `fnv`-hashed map keyed two different ways over the same
//! underlying values — adapted here to index live [`OrderStats`] by price
//! tier on each side of the book, plus by order id.

use crate::order_stats::OrderStats;
use fnv::FnvHashMap;
use rust_decimal::Decimal;
use thiserror::Error;
use vantage_instrument::OrderSide;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderPriceMapError {
    #[error("price tier {0} on this side already holds an order")]
    PriceTierOccupied(Decimal),
    #[error("no order registered with id {0}")]
    UnknownOrderId(u64),
}

/// Indexes live orders by `(side, price)` and by `order_id`.
///
/// Invariant: at most one order per price tier on a given side; every order
/// reachable from a price index is also reachable from the id index.
#[derive(Debug, Default)]
pub struct OrderPriceMap {
    bids: FnvHashMap<Decimal, u64>,
    asks: FnvHashMap<Decimal, u64>,
    by_id: FnvHashMap<u64, OrderStats>,
}

impl OrderPriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: OrderStats) -> Result<(), OrderPriceMapError> {
        let side_index = match order.side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        if side_index.contains_key(&order.price_current) {
            return Err(OrderPriceMapError::PriceTierOccupied(order.price_current));
        }
        side_index.insert(order.price_current, order.order_id);
        self.by_id.insert(order.order_id, order);
        Ok(())
    }

    pub fn get(&self, order_id: u64) -> Option<&OrderStats> {
        self.by_id.get(&order_id)
    }

    pub fn get_mut(&mut self, order_id: u64) -> Option<&mut OrderStats> {
        self.by_id.get_mut(&order_id)
    }

    pub fn at_price(&self, side: OrderSide, price: Decimal) -> Option<&OrderStats> {
        let side_index = match side {
            OrderSide::Buy => &self.bids,
            OrderSide::Sell => &self.asks,
        };
        side_index.get(&price).and_then(|id| self.by_id.get(id))
    }

    /// Removes an order from both indexes (e.g. once fully filled or cancelled).
    pub fn remove(&mut self, order_id: u64) -> Result<OrderStats, OrderPriceMapError> {
        let order = self
            .by_id
            .remove(&order_id)
            .ok_or(OrderPriceMapError::UnknownOrderId(order_id))?;
        let side_index = match order.side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        };
        side_index.remove(&order.price_current);
        Ok(order)
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &OrderStats> {
        self.by_id.values().filter(|o| o.active)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: u64, side: OrderSide, price: Decimal) -> OrderStats {
        OrderStats::new(id, side, price, dec!(10), Utc::now())
    }

    #[test]
    fn insert_and_lookup_by_both_indexes() {
        let mut map = OrderPriceMap::new();
        map.insert(order(1, OrderSide::Buy, dec!(100))).unwrap();

        assert_eq!(map.get(1).unwrap().order_id, 1);
        assert_eq!(map.at_price(OrderSide::Buy, dec!(100)).unwrap().order_id, 1);
        assert!(map.at_price(OrderSide::Sell, dec!(100)).is_none());
    }

    #[test]
    fn rejects_duplicate_price_tier_same_side() {
        let mut map = OrderPriceMap::new();
        map.insert(order(1, OrderSide::Buy, dec!(100))).unwrap();
        let err = map.insert(order(2, OrderSide::Buy, dec!(100))).unwrap_err();
        assert_eq!(err, OrderPriceMapError::PriceTierOccupied(dec!(100)));
    }

    #[test]
    fn same_price_different_side_is_allowed() {
        let mut map = OrderPriceMap::new();
        map.insert(order(1, OrderSide::Buy, dec!(100))).unwrap();
        map.insert(order(2, OrderSide::Sell, dec!(100))).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn remove_clears_both_indexes() {
        let mut map = OrderPriceMap::new();
        map.insert(order(1, OrderSide::Buy, dec!(100))).unwrap();
        map.remove(1).unwrap();
        assert!(map.get(1).is_none());
        assert!(map.at_price(OrderSide::Buy, dec!(100)).is_none());
    }
}
