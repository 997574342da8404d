//! Shared strategy bookkeeping and the [`BaseStrategy`] contract concrete
//! strategies (in the `strategies` crate) implement on top of it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vantage_execution::{MarketDataUpdate, OrderUpdate};
use vantage_instrument::OrderStatus;
use vantage_risk::RiskMetrics;

use crate::control::{RunState, StrategyControlState};
use crate::error::StrategyError;
use crate::position::{EstimatedPosition, Pnl};

/// Bookkeeping shared by every concrete strategy: position, P&L, risk
/// posture, run-state, pending outbound signals, and `OrderUpdate`
/// deduplication. A concrete strategy embeds one `StrategyCore` and adds its
/// own parameters/indicators alongside it.
#[derive(Debug)]
pub struct StrategyCore {
    pub strategy_id: String,
    pub position: EstimatedPosition,
    pub pnl: Pnl,
    pub risk: RiskMetrics,
    pub control: StrategyControlState,
    signals: VecDeque<vantage_execution::TradingSignal>,
    max_signal_queue: usize,
    /// Last-seen `(status, filled_qty)` per order id, used both to recover
    /// the incremental fill delta from a cumulative snapshot and to drop
    /// redelivered duplicates.
    seen_orders: HashMap<u64, (OrderStatus, Decimal)>,
}

impl StrategyCore {
    pub fn new(
        strategy_id: impl Into<String>,
        max_position_size: Decimal,
        max_exposure: Decimal,
        max_signal_queue: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            position: EstimatedPosition::new(now),
            pnl: Pnl::new(now),
            risk: RiskMetrics::new(max_position_size, max_exposure, now),
            control: StrategyControlState::new(now),
            signals: VecDeque::new(),
            max_signal_queue,
            seen_orders: HashMap::new(),
        }
    }

    /// Applies an `OrderUpdate` addressed to this strategy. Updates not
    /// addressed here (`strategy_id` mismatch) or already-seen
    /// `(status, filled_qty)` pairs are dropped silently, returning `None`.
    /// Otherwise returns the realized P&L delta from any new fill quantity.
    pub fn apply_order_update(&mut self, update: &OrderUpdate) -> Option<Decimal> {
        if update.strategy_id != self.strategy_id {
            return None;
        }

        let prior = self.seen_orders.get(&update.order_id).copied();
        if prior == Some((update.status, update.filled_qty)) {
            return None;
        }

        let prior_filled = prior.map(|(_, qty)| qty).unwrap_or(Decimal::ZERO);
        let delta = update.filled_qty - prior_filled;
        self.seen_orders
            .insert(update.order_id, (update.status, update.filled_qty));

        if delta > Decimal::ZERO {
            let realized = self
                .position
                .apply_fill(update.side, delta, update.avg_price, update.timestamp);
            self.pnl.realized += realized;
            self.risk
                .update(self.position.net_qty, update.price, update.timestamp);
            Some(realized)
        } else {
            None
        }
    }

    pub fn mark_to_market(&mut self, update: &MarketDataUpdate) {
        if let (Some(bid), Some(ask)) = (update.best_bid(), update.best_ask()) {
            self.pnl
                .update_unrealized(&self.position, bid, ask, update.timestamp);
        }
    }

    /// Queues a signal for later draining, unless the strategy is currently
    /// breaching its risk limits — a breaching signal is discarded, not
    /// raised as an error, so a misbehaving strategy simply goes quiet
    /// rather than erroring the caller.
    pub fn add_signal(&mut self, signal: vantage_execution::TradingSignal) {
        if !self.risk.check_risk_limits() {
            return;
        }
        while self.signals.len() >= self.max_signal_queue {
            self.signals.pop_front();
        }
        self.signals.push_back(signal);
    }

    pub fn drain_signals(&mut self) -> Vec<vantage_execution::TradingSignal> {
        self.signals.drain(..).collect()
    }

    pub fn pending_signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.position = EstimatedPosition::new(now);
        self.pnl = Pnl::new(now);
        self.risk.position_size = Decimal::ZERO;
        self.risk.exposure_value = Decimal::ZERO;
        self.risk.timestamp = now;
        self.signals.clear();
        self.seen_orders.clear();
        self.control = StrategyControlState::new(now);
    }
}

/// Lifecycle contract every concrete strategy implements. Default method
/// bodies perform the shared bookkeeping (mark-to-market, fill application,
/// run-state gating); a concrete strategy supplies [`BaseStrategy::on_tick`]
/// for its own signal-generation logic and exposes its [`StrategyCore`] via
/// [`core`](BaseStrategy::core)/[`core_mut`](BaseStrategy::core_mut).
pub trait BaseStrategy {
    fn core(&self) -> &StrategyCore;
    fn core_mut(&mut self) -> &mut StrategyCore;

    /// Strategy-specific reaction to a market data update, invoked only
    /// while the strategy is active. Implementations call
    /// [`StrategyCore::add_signal`] to emit intent.
    fn on_tick(&mut self, update: &MarketDataUpdate);

    fn initialize(&mut self, now: DateTime<Utc>) {
        self.core_mut().reset(now);
    }

    fn on_market_data(&mut self, update: &MarketDataUpdate) {
        if self.core().control.run_state == RunState::Stopped {
            return;
        }
        self.core_mut().mark_to_market(update);
        if self.core().control.is_active() {
            self.on_tick(update);
        }
    }

    fn on_order_update(&mut self, update: &OrderUpdate) -> Option<Decimal> {
        self.core_mut().apply_order_update(update)
    }

    fn on_timer(&mut self, _now: DateTime<Utc>) {}

    fn activate(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        self.core_mut().control.activate(now)
    }

    fn deactivate(&mut self, now: DateTime<Utc>) {
        self.core_mut().control.deactivate(now);
    }

    fn trigger_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        self.core_mut().control.trigger_exit(now)
    }

    fn trigger_flatten(
        &mut self,
        reason: impl Into<String>,
        aggressive: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StrategyError> {
        self.core_mut().control.trigger_flatten(reason, aggressive, now)
    }

    fn complete_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        let flat = self.core().position.is_flat();
        self.core_mut().control.complete_exit(flat, now)
    }

    /// Net exposure reported for status/risk aggregation. Defaults to
    /// `core().position.net_qty`; a strategy tracking more than one
    /// instrument (e.g. a hedge pair) overrides this with its own combined
    /// delta.
    fn reported_position(&self) -> Decimal {
        self.core().position.net_qty
    }

    fn add_signal(&mut self, signal: vantage_execution::TradingSignal) {
        self.core_mut().add_signal(signal);
    }

    fn drain_signals(&mut self) -> Vec<vantage_execution::TradingSignal> {
        self.core_mut().drain_signals()
    }

    fn reset(&mut self, now: DateTime<Utc>) {
        self.core_mut().reset(now);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use vantage_instrument::Side;

    struct NoopStrategy {
        core: StrategyCore,
    }

    impl BaseStrategy for NoopStrategy {
        fn core(&self) -> &StrategyCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut StrategyCore {
            &mut self.core
        }
        fn on_tick(&mut self, _update: &MarketDataUpdate) {}
    }

    proptest! {
        /// Invariant 7 (routing isolation): an `OrderUpdate` addressed to a
        /// different strategy id never mutates this strategy's position.
        #[test]
        fn order_update_never_crosses_strategy_ids(
            other_id in "[a-z]{1,8}",
            qty in 1.0f64..500.0,
            price in 1.0f64..500.0,
        ) {
            prop_assume!(other_id != "s1");

            let mut s = NoopStrategy {
                core: StrategyCore::new("s1", Decimal::from(1000), Decimal::from(1_000_000), 16, Utc::now()),
            };
            let before = s.core().position.clone();

            let update = OrderUpdate {
                order_id: 1,
                client_order_id: "cid".into(),
                strategy_id: other_id,
                symbol: "ag_F_2_SFE".into(),
                side: Side::Buy,
                price: Decimal::try_from(price).unwrap(),
                avg_price: Decimal::try_from(price).unwrap(),
                quantity: Decimal::try_from(qty).unwrap(),
                filled_qty: Decimal::try_from(qty).unwrap(),
                status: OrderStatus::Traded,
                timestamp: Utc::now(),
            };
            s.on_order_update(&update);

            prop_assert_eq!(s.core().position.clone(), before);
        }
    }
}
