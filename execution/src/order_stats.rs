//! Per-order state tracking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vantage_instrument::{OrderHitType, OrderSide, OrderStatus};

/// Estimated position of an order in the venue's priority queue at its price
/// level, as inferred from book depth ahead of and behind it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QueuePosition {
    pub quant_ahead: Decimal,
    pub quant_behind: Decimal,
}

/// Live state for a single order.
///
/// Invariant: `done + open + cancelled == current` at all times — every unit
/// of an order's current quantity is accounted for in exactly one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStats {
    pub order_id: u64,
    pub active: bool,
    pub is_new: bool,
    pub modify_pending: bool,
    pub cancel_requested: bool,
    pub modify_count: u32,
    pub last_update: DateTime<Utc>,

    pub qty_old: Decimal,
    pub qty_new: Decimal,
    pub qty_current: Decimal,
    pub qty_open: Decimal,
    pub qty_cancelled: Decimal,
    pub qty_done: Decimal,

    pub queue_position: QueuePosition,

    pub price_current: Decimal,
    pub price_new: Decimal,
    pub price_old: Decimal,

    pub side: OrderSide,
    pub hit_type: OrderHitType,
    pub status: OrderStatus,

    pub reject_count: u32,
    pub last_cancel_reject_order_id: Option<u64>,
}

impl OrderStats {
    pub fn new(
        order_id: u64,
        side: OrderSide,
        price: Decimal,
        quantity: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            active: true,
            is_new: true,
            modify_pending: false,
            cancel_requested: false,
            modify_count: 0,
            last_update: now,
            qty_old: Decimal::ZERO,
            qty_new: quantity,
            qty_current: quantity,
            qty_open: quantity,
            qty_cancelled: Decimal::ZERO,
            qty_done: Decimal::ZERO,
            queue_position: QueuePosition::default(),
            price_current: price,
            price_new: price,
            price_old: price,
            side,
            hit_type: OrderHitType::Standard,
            status: OrderStatus::Init,
            reject_count: 0,
            last_cancel_reject_order_id: None,
        }
    }

    /// Invariant check: `done + open + cancelled == current`.
    pub fn is_consistent(&self) -> bool {
        self.qty_done + self.qty_open + self.qty_cancelled == self.qty_current
    }

    /// Applies a fill of `qty` at `price`, moving it from `open` to `done`.
    pub fn apply_fill(&mut self, qty: Decimal, price: Decimal, now: DateTime<Utc>) {
        let filled = qty.min(self.qty_open);
        self.qty_open -= filled;
        self.qty_done += filled;
        self.price_current = price;
        self.last_update = now;
        self.status = OrderStatus::Traded;
        if self.qty_open.is_zero() {
            self.active = false;
        }
    }

    /// Processes a cancel reject: clears the pending flag, keeps the order
    /// active, and records the rejection per the error-handling policy.
    pub fn reject_cancel(&mut self, now: DateTime<Utc>) {
        self.reject_count += 1;
        self.last_cancel_reject_order_id = Some(self.order_id);
        self.cancel_requested = false;
        self.status = OrderStatus::CancelReject;
        self.last_update = now;
    }

    /// Processes a confirmed cancellation: moves remaining `open` quantity to
    /// `cancelled` and marks the order inactive.
    pub fn confirm_cancel(&mut self, now: DateTime<Utc>) {
        self.qty_cancelled += self.qty_open;
        self.qty_open = Decimal::ZERO;
        self.cancel_requested = false;
        self.active = false;
        self.status = OrderStatus::CancelConfirm;
        self.last_update = now;
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
    fn new_order_is_consistent() {
        let stats = OrderStats::new(1, OrderSide::Buy, dec!(100), dec!(10), now());
        assert!(stats.is_consistent());
        assert_eq!(stats.qty_open, dec!(10));
    }

    #[test]
    fn partial_fill_keeps_invariant() {
        let mut stats = OrderStats::new(1, OrderSide::Buy, dec!(100), dec!(10), now());
        stats.apply_fill(dec!(4), dec!(100), now());
        assert!(stats.is_consistent());
        assert_eq!(stats.qty_done, dec!(4));
        assert_eq!(stats.qty_open, dec!(6));
        assert!(stats.active);
    }

    #[test]
    fn full_fill_deactivates_order() {
        let mut stats = OrderStats::new(1, OrderSide::Buy, dec!(100), dec!(10), now());
        stats.apply_fill(dec!(10), dec!(100), now());
        assert!(stats.is_consistent());
        assert!(!stats.active);
    }

    #[test]
    fn cancel_confirm_moves_remainder_to_cancelled() {
        let mut stats = OrderStats::new(1, OrderSide::Buy, dec!(100), dec!(10), now());
        stats.apply_fill(dec!(3), dec!(100), now());
        stats.confirm_cancel(now());
        assert!(stats.is_consistent());
        assert_eq!(stats.qty_cancelled, dec!(7));
        assert!(!stats.active);
    }

    #[test]
    fn cancel_reject_leaves_order_active() {
        let mut stats = OrderStats::new(1, OrderSide::Buy, dec!(100), dec!(10), now());
        stats.cancel_requested = true;
        stats.reject_cancel(now());
        assert!(!stats.cancel_requested);
        assert!(stats.active);
        assert_eq!(stats.reject_count, 1);
        assert_eq!(stats.last_cancel_reject_order_id, Some(1));
    }
}
