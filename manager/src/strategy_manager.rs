//! Factory, registry, and lifecycle control for concrete strategies.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, warn};
use vantage_execution::{MarketDataUpdate, OrderUpdate, TradingSignal};
use vantage_strategies::{AggressiveStrategy, HedgingStrategy, PassiveStrategy};
use vantage_strategy::{BaseStrategy, RunState, StrategyError};

use crate::config::StrategyConfig;
use crate::error::ManagerError;

/// Copy-on-read snapshot of a strategy's status — cheap to clone so a reader
/// never holds the manager's lock any longer than it takes to copy this out.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyStatus {
    pub strategy_id: String,
    pub run_state: RunState,
    pub active: bool,
    pub net_position: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub position_size: Decimal,
    pub exposure_value: Decimal,
    pub within_risk_limits: bool,
}

/// Object-safe facade over [`BaseStrategy`] so heterogeneous concrete
/// strategies can share one registry. Blanket-implemented for every
/// `BaseStrategy`; concrete strategies never implement it directly.
pub trait ManagedStrategy: fmt::Debug + Send {
    fn strategy_id(&self) -> &str;
    fn on_market_data(&mut self, update: &MarketDataUpdate);
    fn on_order_update(&mut self, update: &OrderUpdate) -> Option<Decimal>;
    fn on_timer(&mut self, now: DateTime<Utc>);
    fn activate(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError>;
    fn deactivate(&mut self, now: DateTime<Utc>);
    fn trigger_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError>;
    fn trigger_flatten(&mut self, reason: &str, aggressive: bool, now: DateTime<Utc>) -> Result<(), StrategyError>;
    fn complete_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError>;
    fn drain_signals(&mut self) -> Vec<TradingSignal>;
    fn status(&self) -> StrategyStatus;
}

impl<T> ManagedStrategy for T
where
    T: BaseStrategy + fmt::Debug + Send,
{
    fn strategy_id(&self) -> &str {
        &self.core().strategy_id
    }

    fn on_market_data(&mut self, update: &MarketDataUpdate) {
        BaseStrategy::on_market_data(self, update)
    }

    fn on_order_update(&mut self, update: &OrderUpdate) -> Option<Decimal> {
        BaseStrategy::on_order_update(self, update)
    }

    fn on_timer(&mut self, now: DateTime<Utc>) {
        BaseStrategy::on_timer(self, now)
    }

    fn activate(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        BaseStrategy::activate(self, now)
    }

    fn deactivate(&mut self, now: DateTime<Utc>) {
        BaseStrategy::deactivate(self, now)
    }

    fn trigger_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        BaseStrategy::trigger_exit(self, now)
    }

    fn trigger_flatten(&mut self, reason: &str, aggressive: bool, now: DateTime<Utc>) -> Result<(), StrategyError> {
        BaseStrategy::trigger_flatten(self, reason.to_string(), aggressive, now)
    }

    fn complete_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        BaseStrategy::complete_exit(self, now)
    }

    fn drain_signals(&mut self) -> Vec<TradingSignal> {
        BaseStrategy::drain_signals(self)
    }

    fn status(&self) -> StrategyStatus {
        let core = self.core();
        StrategyStatus {
            strategy_id: core.strategy_id.clone(),
            run_state: core.control.run_state,
            active: core.control.is_active(),
            net_position: self.reported_position(),
            realized_pnl: core.pnl.realized,
            unrealized_pnl: core.pnl.unrealized,
            position_size: core.risk.position_size,
            exposure_value: core.risk.exposure_value,
            within_risk_limits: core.risk.check_risk_limits(),
        }
    }
}

/// Owns the strategyId → strategy table and drives dynamic add/remove and
/// activation. Holds one `RwLock` over the table; it is never held across an
/// external I/O call.
#[derive(Default)]
pub struct StrategyManager {
    strategies: RwLock<HashMap<String, Box<dyn ManagedStrategy>>>,
    hot_reload_enabled: bool,
}

impl fmt::Debug for StrategyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyManager")
            .field("count", &self.strategies.read().len())
            .finish()
    }
}

impl StrategyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables [`ReloadStrategyModel`](StrategyManager::reload_strategy_model)/
    /// [`UpdateParameters`](StrategyManager::update_parameters); both fail with
    /// `ManagerError::Config` while this is left at its default `false`.
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload_enabled = enabled;
        self
    }

    fn build(config: &StrategyConfig, now: DateTime<Utc>) -> Result<Box<dyn ManagedStrategy>, ManagerError> {
        match config {
            StrategyConfig::Aggressive(params) => Ok(Box::new(AggressiveStrategy::new(
                params.strategy_id.clone(),
                params.symbol.clone(),
                params.into(),
                now,
            ))),
            StrategyConfig::Passive(params) => Ok(Box::new(PassiveStrategy::new(
                params.strategy_id.clone(),
                params.symbol.clone(),
                params.into(),
                now,
            ))),
            StrategyConfig::Hedging(params) => {
                Ok(Box::new(HedgingStrategy::new(params.strategy_id.clone(), params.into(), now)))
            }
            StrategyConfig::PairwiseArb { strategy_id } => Err(ManagerError::Config(format!(
                "strategy '{strategy_id}': kind 'pairwise_arb' has no registered constructor"
            ))),
        }
    }

    /// Creates and activates every enabled config entry, registering each
    /// with this manager. Stops at the first failure; already-registered
    /// entries from this call are not rolled back.
    pub fn load_strategies(&self, configs: &[StrategyConfig], now: DateTime<Utc>) -> Result<(), ManagerError> {
        for config in configs {
            let id = config.strategy_id().to_string();
            let strategy = Self::build(config, now)?;
            self.strategies.write().insert(id.clone(), strategy);
            info!(strategy_id = %id, "strategy loaded");
        }
        Ok(())
    }

    pub fn add_strategy(&self, config: &StrategyConfig, now: DateTime<Utc>) -> Result<(), ManagerError> {
        let id = config.strategy_id().to_string();
        if self.strategies.read().contains_key(&id) {
            return Err(ManagerError::Config(format!("strategy '{id}' already registered")));
        }
        let strategy = Self::build(config, now)?;
        self.strategies.write().insert(id.clone(), strategy);
        info!(strategy_id = %id, "strategy added");
        Ok(())
    }

    /// Stops the strategy first (flatten request), then deregisters it.
    pub fn remove_strategy(&self, strategy_id: &str, now: DateTime<Utc>) -> Result<(), ManagerError> {
        let mut table = self.strategies.write();
        let strategy = table
            .get_mut(strategy_id)
            .ok_or_else(|| ManagerError::NotFound(strategy_id.to_string()))?;
        let _ = strategy.trigger_flatten("strategy_removed", true, now);
        table.remove(strategy_id);
        info!(strategy_id, "strategy removed");
        Ok(())
    }

    /// Re-applies `config`'s parameters to an already-registered strategy by
    /// rebuilding it in place, preserving its current activation state.
    /// Requires hot reload to be enabled via
    /// [`with_hot_reload`](StrategyManager::with_hot_reload).
    pub fn update_parameters(
        &self,
        strategy_id: &str,
        config: &StrategyConfig,
        now: DateTime<Utc>,
    ) -> Result<(), ManagerError> {
        if !self.hot_reload_enabled {
            return Err(ManagerError::Config("hot reload is disabled for this manager".to_string()));
        }
        if config.strategy_id() != strategy_id {
            return Err(ManagerError::Config(format!(
                "reload config strategy_id '{}' does not match target '{strategy_id}'",
                config.strategy_id()
            )));
        }

        let mut table = self.strategies.write();
        let was_active = table
            .get(strategy_id)
            .ok_or_else(|| ManagerError::NotFound(strategy_id.to_string()))?
            .status()
            .active;

        let mut replacement = Self::build(config, now)?;
        if was_active {
            replacement.activate(now)?;
        }
        table.insert(strategy_id.to_string(), replacement);
        info!(strategy_id, "strategy parameters reloaded");
        Ok(())
    }

    /// Parses a JSON-encoded [`StrategyConfig`] model file and applies it via
    /// [`update_parameters`](StrategyManager::update_parameters).
    pub fn reload_strategy_model(
        &self,
        strategy_id: &str,
        model_path: &std::path::Path,
        now: DateTime<Utc>,
    ) -> Result<(), ManagerError> {
        if !self.hot_reload_enabled {
            return Err(ManagerError::Config("hot reload is disabled for this manager".to_string()));
        }
        let contents = std::fs::read_to_string(model_path)?;
        let config: StrategyConfig = serde_json::from_str(&contents)
            .map_err(|err| ManagerError::Config(format!("invalid model file: {err}")))?;
        self.update_parameters(strategy_id, &config, now)
    }

    pub fn activate_strategy(&self, strategy_id: &str, now: DateTime<Utc>) -> Result<(), ManagerError> {
        let mut table = self.strategies.write();
        let strategy = table
            .get_mut(strategy_id)
            .ok_or_else(|| ManagerError::NotFound(strategy_id.to_string()))?;
        strategy.activate(now)?;
        info!(strategy_id, "strategy activated");
        Ok(())
    }

    pub fn deactivate_strategy(&self, strategy_id: &str, reason: &str, now: DateTime<Utc>) -> Result<(), ManagerError> {
        let mut table = self.strategies.write();
        let strategy = table
            .get_mut(strategy_id)
            .ok_or_else(|| ManagerError::NotFound(strategy_id.to_string()))?;
        strategy.deactivate(now);
        warn!(strategy_id, reason, "strategy deactivated");
        Ok(())
    }

    pub fn on_market_data(&self, update: &MarketDataUpdate) {
        let mut table = self.strategies.write();
        for strategy in table.values_mut() {
            strategy.on_market_data(update);
        }
    }

    /// Routes to the single strategy named by `update.strategy_id`; unknown
    /// ids are dropped silently, matching the routing-isolation contract.
    pub fn on_order_update(&self, update: &OrderUpdate) {
        if let Some(strategy) = self.strategies.write().get_mut(&update.strategy_id) {
            strategy.on_order_update(update);
        }
    }

    pub fn drain_all_signals(&self) -> Vec<TradingSignal> {
        self.strategies
            .write()
            .values_mut()
            .flat_map(|s| s.drain_signals())
            .collect()
    }

    pub fn get_status(&self, strategy_id: &str) -> Option<StrategyStatus> {
        self.strategies.read().get(strategy_id).map(|s| s.status())
    }

    pub fn get_all_statuses(&self) -> Vec<StrategyStatus> {
        self.strategies.read().values().map(|s| s.status()).collect()
    }

    pub fn get_aggregated_pnl(&self) -> Decimal {
        self.strategies
            .read()
            .values()
            .map(|s| s.status())
            .map(|s| s.realized_pnl + s.unrealized_pnl)
            .sum()
    }

    pub fn strategy_ids(&self) -> Vec<String> {
        self.strategies.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.read().is_empty()
    }

    /// Requests a flatten on every managed strategy, e.g. for a global risk event.
    pub fn trigger_global_flatten(&self, reason: &str, now: DateTime<Utc>) {
        let mut table = self.strategies.write();
        for (id, strategy) in table.iter_mut() {
            if let Err(err) = strategy.trigger_flatten(reason, true, now) {
                warn!(strategy_id = %id, %err, "flatten request rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggressiveParams;

    fn aggressive_config(id: &str, symbol: &str) -> StrategyConfig {
        StrategyConfig::Aggressive(AggressiveParams {
            strategy_id: id.to_string(),
            symbol: symbol.to_string(),
            trend_period: 50,
            momentum_period: 20,
            signal_threshold: 0.6,
            order_size: 20.0,
            max_position_size: 100.0,
            max_exposure: 1_000_000.0,
            stop_loss_percent: 0.02,
            take_profit_percent: 0.05,
            min_volatility: 1e-4,
            use_volatility_scale: true,
            signal_refresh_ms: 2000,
        })
    }

    #[test]
    fn load_and_activate_a_strategy() {
        let manager = StrategyManager::new();
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();
        assert_eq!(manager.len(), 1);
        manager.activate_strategy("s1", now).unwrap();
        let status = manager.get_status("s1").unwrap();
        assert!(status.active);
    }

    #[test]
    fn unknown_strategy_id_is_not_found() {
        let manager = StrategyManager::new();
        let err = manager.activate_strategy("missing", Utc::now()).unwrap_err();
        assert!(matches!(err, ManagerError::NotFound(_)));
    }

    #[test]
    fn pairwise_arb_is_not_yet_implemented() {
        let manager = StrategyManager::new();
        let err = manager
            .load_strategies(&[StrategyConfig::PairwiseArb { strategy_id: "s2".into() }], Utc::now())
            .unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn remove_strategy_deregisters_it() {
        let manager = StrategyManager::new();
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();
        manager.remove_strategy("s1", now).unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn reload_fails_cleanly_when_hot_reload_is_disabled() {
        let manager = StrategyManager::new();
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();

        let err = manager
            .update_parameters("s1", &aggressive_config("s1", "ag_F_2_SFE"), now)
            .unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn reload_rebuilds_strategy_preserving_activation() {
        let manager = StrategyManager::new().with_hot_reload(true);
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();
        manager.activate_strategy("s1", now).unwrap();

        let mut new_config = aggressive_config("s1", "ag_F_2_SFE");
        if let StrategyConfig::Aggressive(params) = &mut new_config {
            params.order_size = 99.0;
        }
        manager.update_parameters("s1", &new_config, now).unwrap();

        let status = manager.get_status("s1").unwrap();
        assert!(status.active);
    }

    #[test]
    fn reload_rejects_mismatched_strategy_id() {
        let manager = StrategyManager::new().with_hot_reload(true);
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();

        let err = manager
            .update_parameters("s1", &aggressive_config("other", "ag_F_2_SFE"), now)
            .unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn order_update_for_unknown_strategy_is_silently_dropped() {
        let manager = StrategyManager::new();
        let now = Utc::now();
        manager
            .load_strategies(&[aggressive_config("s1", "ag_F_2_SFE")], now)
            .unwrap();

        let update = OrderUpdate {
            order_id: 1,
            client_order_id: "c1".into(),
            strategy_id: "other".into(),
            symbol: "ag_F_2_SFE".into(),
            side: vantage_instrument::Side::Buy,
            price: Decimal::from(100),
            avg_price: Decimal::from(100),
            quantity: Decimal::from(10),
            filled_qty: Decimal::from(10),
            status: vantage_instrument::OrderStatus::Traded,
            timestamp: now,
        };
        manager.on_order_update(&update);
        let status = manager.get_status("s1").unwrap();
        assert_eq!(status.net_position, Decimal::ZERO);
    }
}
