//! Market-making strategy: quotes both sides around mid at a distance
//! proportional to the measured spread, skewed against current inventory.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use vantage_execution::{MarketDataUpdate, TradingSignal};
use vantage_instrument::Side;
use vantage_strategy::{BaseStrategy, StrategyCore};

#[derive(Debug, Clone)]
pub struct PassiveConfig {
    pub spread_multiplier: Decimal,
    pub order_size: Decimal,
    pub max_inventory: Decimal,
    pub max_exposure: Decimal,
    pub inventory_skew: Decimal,
    pub min_spread: Decimal,
    pub order_refresh: Duration,
    pub use_order_imbalance: bool,
}

impl Default for PassiveConfig {
    fn default() -> Self {
        Self {
            spread_multiplier: Decimal::new(15, 1), // 1.5
            order_size: Decimal::from(10),
            max_inventory: Decimal::from(50),
            max_exposure: Decimal::from(1_000_000),
            inventory_skew: Decimal::new(5, 1), // 0.5
            min_spread: Decimal::new(1, 2),     // 0.01
            order_refresh: Duration::milliseconds(500),
            use_order_imbalance: true,
        }
    }
}

#[derive(Debug)]
pub struct PassiveStrategy {
    pub symbol: String,
    pub config: PassiveConfig,
    core: StrategyCore,
    last_quote_time: Option<DateTime<Utc>>,
}

impl PassiveStrategy {
    pub fn new(strategy_id: impl Into<String>, symbol: impl Into<String>, config: PassiveConfig, now: DateTime<Utc>) -> Self {
        let core = StrategyCore::new(strategy_id, config.max_inventory, config.max_exposure, 64, now);
        Self {
            symbol: symbol.into(),
            config,
            core,
            last_quote_time: None,
        }
    }
}

impl BaseStrategy for PassiveStrategy {
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
        let Some(spread) = update.spread() else { return };

        if spread < self.config.min_spread {
            return;
        }

        if let Some(last) = self.last_quote_time {
            if update.timestamp - last < self.config.order_refresh {
                return;
            }
        }

        let half_spread = spread * self.config.spread_multiplier / Decimal::from(2);

        let net_qty = self.core.position.net_qty;
        let inventory_ratio = if self.config.max_inventory.is_zero() {
            Decimal::ZERO
        } else {
            net_qty / self.config.max_inventory
        };
        let skew = self.config.inventory_skew * inventory_ratio * half_spread;

        let mut bias = Decimal::ZERO;
        if self.config.use_order_imbalance {
            if let (Some(&bid_qty), Some(&ask_qty)) = (update.bid_qty.first(), update.ask_qty.first()) {
                let total = bid_qty + ask_qty;
                if !total.is_zero() {
                    let imbalance = (bid_qty - ask_qty) / total;
                    bias = imbalance * half_spread;
                }
            }
        }

        let buy_price = mid - half_spread - skew + bias;
        let sell_price = mid + half_spread - skew + bias;

        // keep quotes sane relative to the book even after skew/bias
        let buy_price = buy_price.min(bid);
        let sell_price = sell_price.max(ask);

        let buy_headroom = (self.config.max_inventory - net_qty).max(Decimal::ZERO);
        let sell_headroom = (self.config.max_inventory + net_qty).max(Decimal::ZERO);

        let buy_qty = self.config.order_size.min(buy_headroom);
        let sell_qty = self.config.order_size.min(sell_headroom);

        if buy_qty > Decimal::ZERO {
            self.core.add_signal(TradingSignal::new(
                self.core.strategy_id.clone(),
                self.symbol.clone(),
                Side::Buy,
                buy_price,
                buy_qty,
                0.0,
                0.5,
                update.timestamp,
            ));
        }
        if sell_qty > Decimal::ZERO {
            self.core.add_signal(TradingSignal::new(
                self.core.strategy_id.clone(),
                self.symbol.clone(),
                Side::Sell,
                sell_price,
                sell_qty,
                0.0,
                0.5,
                update.timestamp,
            ));
        }

        self.last_quote_time = Some(update.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn md(bid: Decimal, ask: Decimal, bid_qty: Decimal, ask_qty: Decimal, ts: DateTime<Utc>) -> MarketDataUpdate {
        MarketDataUpdate {
            symbol: "ag_F_2_SFE".into(),
            venue: "B3".into(),
            timestamp: ts,
            bid_price: vec![bid],
            bid_qty: vec![bid_qty],
            ask_price: vec![ask],
            ask_qty: vec![ask_qty],
            last_price: (bid + ask) / Decimal::from(2),
            total_volume: Decimal::ZERO,
            turnover: Decimal::ZERO,
        }
    }

    #[test]
    fn quotes_both_sides_when_spread_is_wide_enough() {
        let now = Utc::now();
        let mut strat = PassiveStrategy::new("s1", "ag_F_2_SFE", PassiveConfig::default(), now);
        strat.activate(now).unwrap();
        strat.on_market_data(&md(dec!(99), dec!(101), dec!(10), dec!(10), now));
        let signals = strat.drain_signals();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().any(|s| s.side == Side::Buy));
        assert!(signals.iter().any(|s| s.side == Side::Sell));
    }

    #[test]
    fn refuses_to_quote_below_min_spread() {
        let now = Utc::now();
        let mut strat = PassiveStrategy::new("s1", "ag_F_2_SFE", PassiveConfig::default(), now);
        strat.activate(now).unwrap();
        strat.on_market_data(&md(dec!(100.0), dec!(100.001), dec!(10), dec!(10), now));
        assert!(strat.drain_signals().is_empty());
    }

    #[test]
    fn refresh_interval_bounds_quote_cadence() {
        let now = Utc::now();
        let mut strat = PassiveStrategy::new("s1", "ag_F_2_SFE", PassiveConfig::default(), now);
        strat.activate(now).unwrap();
        strat.on_market_data(&md(dec!(99), dec!(101), dec!(10), dec!(10), now));
        strat.drain_signals();
        strat.on_market_data(&md(dec!(99), dec!(101), dec!(10), dec!(10), now + Duration::milliseconds(50)));
        assert!(strat.drain_signals().is_empty());
    }

    #[test]
    fn long_inventory_skews_quotes_down() {
        let now = Utc::now();
        let mut strat = PassiveStrategy::new("s1", "ag_F_2_SFE", PassiveConfig::default(), now);
        strat.activate(now).unwrap();
        strat.core.position.apply_fill(Side::Buy, dec!(40), dec!(100), now);
        strat.on_market_data(&md(dec!(99), dec!(101), dec!(10), dec!(10), now));
        let signals = strat.drain_signals();
        let sell = signals.iter().find(|s| s.side == Side::Sell).unwrap();
        // heavily long inventory should still offer to sell close to the book
        assert!(sell.price <= dec!(101) + dec!(1));
    }
}
