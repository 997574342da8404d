//! Delta-neutral hedging strategy across a primary/hedge symbol pair.
//!
//! Positions are tracked independently per symbol (see the crate-level
//! design note on why this deviates from a single combined net position),
//! and a dynamic hedge ratio is refit from rolling simple returns.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use vantage_execution::{MarketDataUpdate, OrderUpdate, TradingSignal};
use vantage_instrument::{OrderStatus, Side};
use vantage_strategy::{BaseStrategy, EstimatedPosition, StrategyCore};

use crate::shared::RollingHistory;

#[derive(Debug, Clone)]
pub struct HedgingConfig {
    pub primary_symbol: String,
    pub hedge_symbol: String,
    pub target_delta: Decimal,
    pub rebalance_threshold: Decimal,
    pub min_rebalance_interval: Duration,
    pub order_size: Decimal,
    pub max_position_size: Decimal,
    pub max_exposure: Decimal,
    pub dynamic_hedge_ratio: bool,
    pub correlation_period: usize,
    pub min_spread: Decimal,
}

impl HedgingConfig {
    pub fn new(primary_symbol: impl Into<String>, hedge_symbol: impl Into<String>) -> Self {
        Self {
            primary_symbol: primary_symbol.into(),
            hedge_symbol: hedge_symbol.into(),
            target_delta: Decimal::ZERO,
            rebalance_threshold: Decimal::from(5),
            min_rebalance_interval: Duration::seconds(60),
            order_size: Decimal::from(10),
            max_position_size: Decimal::from(100),
            max_exposure: Decimal::from(1_000_000),
            dynamic_hedge_ratio: true,
            correlation_period: 30,
            min_spread: Decimal::new(1, 2),
        }
    }
}

const MIN_HEDGE_RATIO: f64 = 0.5;
const MAX_HEDGE_RATIO: f64 = 2.0;
const HISTORY_CAPACITY: usize = 200;

#[derive(Debug)]
pub struct HedgingStrategy {
    core: StrategyCore,
    config: HedgingConfig,
    pub primary_position: EstimatedPosition,
    pub hedge_position: EstimatedPosition,
    primary_history: RollingHistory,
    hedge_history: RollingHistory,
    hedge_ratio: Decimal,
    last_rebalance: Option<DateTime<Utc>>,
    last_primary_spread: Option<Decimal>,
    seen_orders: HashMap<u64, (OrderStatus, Decimal)>,
}

impl HedgingStrategy {
    pub fn new(strategy_id: impl Into<String>, config: HedgingConfig, now: DateTime<Utc>) -> Self {
        let core = StrategyCore::new(strategy_id, config.max_position_size, config.max_exposure, 64, now);
        Self {
            core,
            primary_position: EstimatedPosition::new(now),
            hedge_position: EstimatedPosition::new(now),
            primary_history: RollingHistory::new(HISTORY_CAPACITY),
            hedge_history: RollingHistory::new(HISTORY_CAPACITY),
            hedge_ratio: Decimal::ONE,
            last_rebalance: None,
            last_primary_spread: None,
            seen_orders: HashMap::new(),
            config,
        }
    }

    pub fn hedge_ratio(&self) -> Decimal {
        self.hedge_ratio
    }

    pub fn current_delta(&self) -> Decimal {
        self.primary_position.net_qty + self.hedge_ratio * self.hedge_position.net_qty
    }

    fn recompute_hedge_ratio(&mut self) {
        if !self.config.dynamic_hedge_ratio {
            return;
        }
        if self.primary_history.len() < self.config.correlation_period
            || self.hedge_history.len() < self.config.correlation_period
        {
            return;
        }

        let primary_returns = self.primary_history.returns();
        let hedge_returns = self.hedge_history.returns();
        let n = primary_returns.len().min(hedge_returns.len());
        if n < 2 {
            return;
        }

        let mean_p: f64 = primary_returns[primary_returns.len() - n..].iter().sum::<f64>() / n as f64;
        let mean_h: f64 = hedge_returns[hedge_returns.len() - n..].iter().sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_h = 0.0;
        for i in 0..n {
            let dp = primary_returns[primary_returns.len() - n + i] - mean_p;
            let dh = hedge_returns[hedge_returns.len() - n + i] - mean_h;
            cov += dp * dh;
            var_h += dh * dh;
        }

        if var_h.abs() < f64::EPSILON {
            return;
        }

        let beta = (cov / var_h).abs().clamp(MIN_HEDGE_RATIO, MAX_HEDGE_RATIO);
        self.hedge_ratio = Decimal::try_from(beta).unwrap_or(self.hedge_ratio);
    }

    fn maybe_rebalance(&mut self, now: DateTime<Utc>) {
        let Some(spread) = self.last_primary_spread else { return };
        if spread < self.config.min_spread {
            return;
        }

        let delta = self.current_delta();
        let drift = (delta - self.config.target_delta).abs();
        if drift <= self.config.rebalance_threshold {
            return;
        }

        if let Some(last) = self.last_rebalance {
            if now - last < self.config.min_rebalance_interval {
                return;
            }
        }

        if self.hedge_ratio.is_zero() {
            return;
        }

        let raw_units = (self.config.target_delta - delta) / self.hedge_ratio / self.config.order_size;
        let units = raw_units.round();
        let mut qty = units * self.config.order_size;
        if qty.is_zero() {
            return;
        }

        let side = if qty > Decimal::ZERO { Side::Buy } else { Side::Sell };
        qty = qty.abs();

        let projected = self.hedge_position.net_qty.abs() + qty;
        if projected > self.config.max_position_size {
            qty = (self.config.max_position_size - self.hedge_position.net_qty.abs()).max(Decimal::ZERO);
        }
        if qty.is_zero() {
            return;
        }

        self.core.add_signal(TradingSignal::new(
            self.core.strategy_id.clone(),
            self.config.hedge_symbol.clone(),
            side,
            Decimal::ZERO,
            qty,
            if side == Side::Buy { 1.0 } else { -1.0 },
            1.0,
            now,
        ));
        self.last_rebalance = Some(now);
    }
}

impl BaseStrategy for HedgingStrategy {
    fn core(&self) -> &StrategyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    fn reported_position(&self) -> Decimal {
        self.current_delta()
    }

    /// Unused: `HedgingStrategy` overrides [`BaseStrategy::on_market_data`]
    /// directly since it tracks two independent positions rather than the
    /// single one `StrategyCore` assumes.
    fn on_tick(&mut self, _update: &MarketDataUpdate) {}

    fn on_market_data(&mut self, update: &MarketDataUpdate) {
        if self.core.control.run_state == vantage_strategy::RunState::Stopped {
            return;
        }

        let Some(mid) = update.mid() else { return };
        let mid_f: f64 = mid.to_string().parse().unwrap_or(0.0);

        if update.symbol == self.config.primary_symbol {
            self.primary_history.push(mid_f);
            self.last_primary_spread = update.spread();
        } else if update.symbol == self.config.hedge_symbol {
            self.hedge_history.push(mid_f);
        } else {
            return;
        }

        self.recompute_hedge_ratio();

        if self.core.control.is_active() {
            self.maybe_rebalance(update.timestamp);
        }
    }

    fn on_order_update(&mut self, update: &OrderUpdate) -> Option<Decimal> {
        if update.strategy_id != self.core.strategy_id {
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

        if delta <= Decimal::ZERO {
            return None;
        }

        let realized = if update.symbol == self.config.primary_symbol {
            self.primary_position
                .apply_fill(update.side, delta, update.avg_price, update.timestamp)
        } else if update.symbol == self.config.hedge_symbol {
            self.hedge_position
                .apply_fill(update.side, delta, update.avg_price, update.timestamp)
        } else {
            return None;
        };

        self.core.pnl.realized += realized;
        let exposure_qty = self.primary_position.net_qty.abs() + self.hedge_position.net_qty.abs();
        self.core.risk.update(exposure_qty, update.price, update.timestamp);
        Some(realized)
    }
}
