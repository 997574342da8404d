//! Trend/momentum-following strategy: enters on EWMA trend+momentum
//! agreement, exits on a fixed stop-loss/take-profit band.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use vantage_execution::{MarketDataUpdate, TradingSignal};
use vantage_instrument::Side;
use vantage_strategy::{build_flatten_signal, BaseStrategy, StrategyCore};

use crate::shared::{Ewma, VolatilityTracker};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct AggressiveConfig {
    pub trend_period: u32,
    pub momentum_period: u32,
    pub signal_threshold: f64,
    pub order_size: Decimal,
    pub max_position_size: Decimal,
    pub max_exposure: Decimal,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub min_volatility: f64,
    pub use_volatility_scale: bool,
    pub min_refresh_interval: Duration,
}

impl Default for AggressiveConfig {
    fn default() -> Self {
        Self {
            trend_period: 50,
            momentum_period: 20,
            signal_threshold: 0.6,
            order_size: Decimal::from(20),
            max_position_size: Decimal::from(100),
            max_exposure: Decimal::from(1_000_000),
            stop_loss: 0.02,
            take_profit: 0.05,
            min_volatility: 1e-4,
            use_volatility_scale: true,
            min_refresh_interval: Duration::seconds(2),
        }
    }
}

/// Trend-following strategy built on `StrategyCore`'s shared bookkeeping.
#[derive(Debug)]
pub struct AggressiveStrategy {
    pub symbol: String,
    pub config: AggressiveConfig,
    core: StrategyCore,
    trend: Ewma,
    momentum: Ewma,
    volatility: VolatilityTracker,
    entry_price: Option<Decimal>,
    last_signal_time: Option<DateTime<Utc>>,
}

impl AggressiveStrategy {
    pub fn new(strategy_id: impl Into<String>, symbol: impl Into<String>, config: AggressiveConfig, now: DateTime<Utc>) -> Self {
        let core = StrategyCore::new(strategy_id, config.max_position_size, config.max_exposure, 64, now);
        Self {
            symbol: symbol.into(),
            trend: Ewma::new(config.trend_period),
            momentum: Ewma::new(config.momentum_period),
            volatility: VolatilityTracker::new(config.momentum_period),
            config,
            core,
            entry_price: None,
            last_signal_time: None,
        }
    }

    fn emit_exit(&mut self, mid: Decimal, now: DateTime<Utc>, bid: Decimal, ask: Decimal, reason: &'static str) {
        let symbol = self.symbol.clone();
        let strategy_id = self.core.strategy_id.clone();
        if let Some(signal) = build_flatten_signal(strategy_id, symbol, &self.core.position, bid, ask, now) {
            let signal = signal.with_metadata("type", "exit").with_metadata("reason", reason);
            self.core.add_signal(signal);
        }
        self.entry_price = None;
        self.last_signal_time = Some(now);
        let _ = mid;
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

fn from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

impl BaseStrategy for AggressiveStrategy {
    fn core(&self) -> &StrategyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    fn on_tick(&mut self, update: &MarketDataUpdate) {
        let (Some(bid), Some(ask)) = (update.best_bid(), update.best_ask()) else {
            return;
        };
        let Some(mid) = update.mid() else { return };

        if let Some(last) = self.last_signal_time {
            if update.timestamp - last < self.config.min_refresh_interval {
                return;
            }
        }

        let mid_f = to_f64(mid);
        let trend = self.trend.update(mid_f);
        let momentum = self.momentum.update(mid_f);
        let vol = self.volatility.update(mid_f);

        let net_qty = self.core.position.net_qty;
        if !net_qty.is_zero() {
            if let Some(entry) = self.entry_price {
                let entry_f = to_f64(entry);
                if entry_f != 0.0 {
                    let rp = (mid_f - entry_f) / entry_f;
                    let long = net_qty > Decimal::ZERO;
                    let stop_loss_hit = if long { rp <= -self.config.stop_loss } else { rp >= self.config.stop_loss };
                    let take_profit_hit = if long { rp >= self.config.take_profit } else { rp <= -self.config.take_profit };
                    if stop_loss_hit || take_profit_hit {
                        let reason = if stop_loss_hit { "stop_loss" } else { "take_profit" };
                        self.emit_exit(mid, update.timestamp, bid, ask, reason);
                        return;
                    }
                }
            }
        }

        if vol < self.config.min_volatility || trend == 0.0 || momentum == 0.0 {
            return;
        }

        let trend_sig = (mid_f - trend) / trend;
        let mom_sig = (mid_f - momentum) / momentum;
        let raw = 0.6 * trend_sig + 0.4 * mom_sig;
        let signal = (raw * 100.0).clamp(-1.0, 1.0);

        if signal.abs() < self.config.signal_threshold {
            return;
        }

        let confidence =
            (1.0 - (trend_sig - mom_sig).abs() / (trend_sig.abs() + mom_sig.abs() + EPSILON)) * (1.0 - vol);

        let scale = if self.config.use_volatility_scale {
            (1.0 - 10.0 * vol).max(0.5)
        } else {
            1.0
        };
        let mut size = self.config.order_size * from_f64(scale);

        let projected = net_qty.abs() + size;
        if projected > self.config.max_position_size {
            size = (self.config.max_position_size - net_qty.abs()).max(Decimal::ZERO);
        }
        if size.is_zero() {
            return;
        }

        let side = if signal > 0.0 { Side::Buy } else { Side::Sell };
        let price = if side == Side::Buy { ask } else { bid };

        if net_qty.is_zero() {
            self.entry_price = Some(price);
        }

        let signal_obj = TradingSignal::new(
            self.core.strategy_id.clone(),
            self.symbol.clone(),
            side,
            price,
            size,
            signal,
            confidence.clamp(0.0, 1.0),
            update.timestamp,
        );
        self.core.add_signal(signal_obj);
        self.last_signal_time = Some(update.timestamp);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn md(symbol: &str, mid: Decimal, ts: DateTime<Utc>) -> MarketDataUpdate {
        let half = dec!(0.05);
        MarketDataUpdate {
            symbol: symbol.into(),
            venue: "B3".into(),
            timestamp: ts,
            bid_price: vec![mid - half],
            bid_qty: vec![dec!(10)],
            ask_price: vec![mid + half],
            ask_qty: vec![dec!(10)],
            last_price: mid,
            total_volume: Decimal::ZERO,
            turnover: Decimal::ZERO,
        }
    }

    proptest! {
        /// Invariant 8 (refresh bound): within any span shorter than
        /// `min_refresh_interval`, at most one entry signal is emitted.
        #[test]
        fn at_most_one_signal_within_the_refresh_interval(
            mids in prop::collection::vec(50.0f64..200.0, 2..20),
            offsets_ms in prop::collection::vec(0i64..1999, 2..20),
        ) {
            let now = Utc::now();
            let mut strat = AggressiveStrategy::new("s1", "ag_F_2_SFE", AggressiveConfig::default(), now);
            strat.activate(now).unwrap();

            let n = mids.len().min(offsets_ms.len());
            let mut total_signals = 0usize;
            for i in 0..n {
                let ts = now + Duration::milliseconds(offsets_ms[i]);
                let mid = Decimal::try_from(mids[i]).unwrap();
                strat.on_market_data(&md("ag_F_2_SFE", mid, ts));
                total_signals += strat.drain_signals().len();
            }

            // All timestamps fall inside [now, now+2s), one min_refresh_interval
            // window, so at most one entry signal may have fired across the batch.
            prop_assert!(total_signals <= 1);
        }
    }
}
