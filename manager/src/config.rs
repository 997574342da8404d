//! External configuration surface: the seam where raw, serde-deserializable
//! parameters (as they would arrive from JSON/TOML/a config service) become
//! live strategy instances. Numeric fields here are plain primitives —
//! floats and millisecond counts — and are cast to the strategy's internal
//! `Decimal`/`Duration` domain in [`crate::strategy_manager::StrategyManager::load_strategies`].

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vantage_strategies::{AggressiveConfig, HedgingConfig, PassiveConfig};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Aggressive(AggressiveParams),
    Passive(PassiveParams),
    Hedging(HedgingParams),
    /// Accepted for forward compatibility with the factory's named kinds;
    /// not yet backed by a concrete strategy. Loading one fails with
    /// `ManagerError::Config`.
    PairwiseArb { strategy_id: String },
}

impl StrategyConfig {
    pub fn strategy_id(&self) -> &str {
        match self {
            StrategyConfig::Aggressive(p) => &p.strategy_id,
            StrategyConfig::Passive(p) => &p.strategy_id,
            StrategyConfig::Hedging(p) => &p.strategy_id,
            StrategyConfig::PairwiseArb { strategy_id } => strategy_id,
        }
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggressiveParams {
    pub strategy_id: String,
    pub symbol: String,
    #[serde(default = "d_trend_period")]
    pub trend_period: u32,
    #[serde(default = "d_momentum_period")]
    pub momentum_period: u32,
    #[serde(default = "d_signal_threshold")]
    pub signal_threshold: f64,
    #[serde(default = "d_order_size")]
    pub order_size: f64,
    #[serde(default = "d_max_position_size")]
    pub max_position_size: f64,
    #[serde(default = "d_max_exposure")]
    pub max_exposure: f64,
    #[serde(default = "d_stop_loss")]
    pub stop_loss_percent: f64,
    #[serde(default = "d_take_profit")]
    pub take_profit_percent: f64,
    #[serde(default = "d_min_volatility")]
    pub min_volatility: f64,
    #[serde(default = "d_true")]
    pub use_volatility_scale: bool,
    #[serde(default = "d_refresh_ms")]
    pub signal_refresh_ms: i64,
}

fn d_trend_period() -> u32 {
    AggressiveConfig::default().trend_period
}
fn d_momentum_period() -> u32 {
    AggressiveConfig::default().momentum_period
}
fn d_signal_threshold() -> f64 {
    AggressiveConfig::default().signal_threshold
}
fn d_order_size() -> f64 {
    20.0
}
fn d_max_position_size() -> f64 {
    100.0
}
fn d_max_exposure() -> f64 {
    1_000_000.0
}
fn d_stop_loss() -> f64 {
    AggressiveConfig::default().stop_loss
}
fn d_take_profit() -> f64 {
    AggressiveConfig::default().take_profit
}
fn d_min_volatility() -> f64 {
    AggressiveConfig::default().min_volatility
}
fn d_true() -> bool {
    true
}
fn d_refresh_ms() -> i64 {
    AggressiveConfig::default().min_refresh_interval.num_milliseconds()
}

impl From<&AggressiveParams> for AggressiveConfig {
    fn from(p: &AggressiveParams) -> Self {
        Self {
            trend_period: p.trend_period,
            momentum_period: p.momentum_period,
            signal_threshold: p.signal_threshold,
            order_size: to_decimal(p.order_size),
            max_position_size: to_decimal(p.max_position_size),
            max_exposure: to_decimal(p.max_exposure),
            stop_loss: p.stop_loss_percent,
            take_profit: p.take_profit_percent,
            min_volatility: p.min_volatility,
            use_volatility_scale: p.use_volatility_scale,
            min_refresh_interval: Duration::milliseconds(p.signal_refresh_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PassiveParams {
    pub strategy_id: String,
    pub symbol: String,
    #[serde(default = "d_spread_multiplier")]
    pub spread_multiplier: f64,
    #[serde(default = "d_passive_order_size")]
    pub order_size: f64,
    #[serde(default = "d_max_inventory")]
    pub max_inventory: f64,
    #[serde(default = "d_max_exposure")]
    pub max_exposure: f64,
    #[serde(default = "d_inventory_skew")]
    pub inventory_skew: f64,
    #[serde(default = "d_min_spread")]
    pub min_spread: f64,
    #[serde(default = "d_order_refresh_ms")]
    pub order_refresh_ms: i64,
    #[serde(default = "d_true")]
    pub use_order_imbalance: bool,
}

fn d_spread_multiplier() -> f64 {
    1.5
}
fn d_passive_order_size() -> f64 {
    10.0
}
fn d_max_inventory() -> f64 {
    50.0
}
fn d_inventory_skew() -> f64 {
    0.5
}
fn d_min_spread() -> f64 {
    0.01
}
fn d_order_refresh_ms() -> i64 {
    500
}

impl From<&PassiveParams> for PassiveConfig {
    fn from(p: &PassiveParams) -> Self {
        Self {
            spread_multiplier: to_decimal(p.spread_multiplier),
            order_size: to_decimal(p.order_size),
            max_inventory: to_decimal(p.max_inventory),
            max_exposure: to_decimal(p.max_exposure),
            inventory_skew: to_decimal(p.inventory_skew),
            min_spread: to_decimal(p.min_spread),
            order_refresh: Duration::milliseconds(p.order_refresh_ms),
            use_order_imbalance: p.use_order_imbalance,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HedgingParams {
    pub strategy_id: String,
    pub primary_symbol: String,
    pub hedge_symbol: String,
    #[serde(default)]
    pub target_delta: f64,
    #[serde(default = "d_rebalance_threshold")]
    pub rebalance_threshold: f64,
    #[serde(default = "d_min_rebalance_ms")]
    pub min_rebalance_interval_ms: i64,
    #[serde(default = "d_hedge_order_size")]
    pub order_size: f64,
    #[serde(default = "d_hedge_max_position")]
    pub max_position_size: f64,
    #[serde(default = "d_max_exposure")]
    pub max_exposure: f64,
    #[serde(default = "d_true")]
    pub dynamic_hedge_ratio: bool,
    #[serde(default = "d_correlation_period")]
    pub correlation_period: usize,
    #[serde(default = "d_min_spread")]
    pub min_spread: f64,
}

fn d_rebalance_threshold() -> f64 {
    5.0
}
fn d_min_rebalance_ms() -> i64 {
    60_000
}
fn d_hedge_order_size() -> f64 {
    10.0
}
fn d_hedge_max_position() -> f64 {
    100.0
}
fn d_correlation_period() -> usize {
    30
}

impl From<&HedgingParams> for HedgingConfig {
    fn from(p: &HedgingParams) -> Self {
        Self {
            primary_symbol: p.primary_symbol.clone(),
            hedge_symbol: p.hedge_symbol.clone(),
            target_delta: to_decimal(p.target_delta),
            rebalance_threshold: to_decimal(p.rebalance_threshold),
            min_rebalance_interval: Duration::milliseconds(p.min_rebalance_interval_ms),
            order_size: to_decimal(p.order_size),
            max_position_size: to_decimal(p.max_position_size),
            max_exposure: to_decimal(p.max_exposure),
            dynamic_hedge_ratio: p.dynamic_hedge_ratio,
            correlation_period: p.correlation_period,
            min_spread: to_decimal(p.min_spread),
        }
    }
}
