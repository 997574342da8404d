//! Capital allocation, rebalance, correlation, and global flatten across the
//! strategies held by a [`crate::strategy_manager::StrategyManager`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::error::ManagerError;
use crate::strategy_manager::StrategyManager;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub min_allocation: Decimal,
    pub max_allocation: Decimal,
    pub allocation: Decimal,
}

/// Per-strategy figures recomputed by [`PortfolioManager::update_allocations`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyAllocationSnapshot {
    pub strategy_id: String,
    pub allocation: Decimal,
    pub allocated_capital: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub position_size: Decimal,
    pub exposure_value: Decimal,
    pub active: bool,
}

#[derive(Debug, Default)]
struct PortfolioState {
    allocations: HashMap<String, AllocationEntry>,
    total_capital: Decimal,
    pnl_history: Vec<Decimal>,
    max_pnl_history: usize,
}

/// Tracks capital allocation and aggregate performance across the
/// strategies registered with a shared [`StrategyManager`].
#[derive(Debug)]
pub struct PortfolioManager {
    state: RwLock<PortfolioState>,
    enable_correlation_calc: bool,
}

impl PortfolioManager {
    pub fn new(total_capital: Decimal, enable_correlation_calc: bool) -> Self {
        Self {
            state: RwLock::new(PortfolioState {
                allocations: HashMap::new(),
                total_capital,
                pnl_history: Vec::new(),
                max_pnl_history: 1000,
            }),
            enable_correlation_calc,
        }
    }

    pub fn with_max_pnl_history(self, max_pnl_history: usize) -> Self {
        self.state.write().max_pnl_history = max_pnl_history;
        self
    }

    /// Registers a strategy's allocation bounds. Rejects the sum of all
    /// `max_allocation`s (including this one) exceeding 1, and rejects
    /// `min_allocation > max_allocation`.
    pub fn add_strategy(
        &self,
        strategy_id: &str,
        min_allocation: Decimal,
        max_allocation: Decimal,
    ) -> Result<(), ManagerError> {
        if min_allocation > max_allocation {
            return Err(ManagerError::Config(format!(
                "strategy '{strategy_id}': min_allocation {min_allocation} exceeds max_allocation {max_allocation}"
            )));
        }

        let mut state = self.state.write();
        let existing_max: Decimal = state
            .allocations
            .iter()
            .filter(|(id, _)| id.as_str() != strategy_id)
            .map(|(_, entry)| entry.max_allocation)
            .sum();
        if existing_max + max_allocation > Decimal::ONE {
            return Err(ManagerError::Limit(format!(
                "adding '{strategy_id}' would exceed total allocation: {existing_max} + {max_allocation} > 1"
            )));
        }

        let allocation = min_allocation.max(Decimal::ZERO);
        state.allocations.insert(
            strategy_id.to_string(),
            AllocationEntry {
                min_allocation,
                max_allocation,
                allocation,
            },
        );
        Ok(())
    }

    pub fn remove_strategy(&self, strategy_id: &str) {
        self.state.write().allocations.remove(strategy_id);
    }

    /// Recomputes per-strategy allocated capital, totals P&L, position size,
    /// exposure, and active count by reading status from `manager`. Appends
    /// the portfolio's total realized+unrealized P&L to the bounded history.
    pub fn update_allocations(&self, manager: &StrategyManager) -> Vec<StrategyAllocationSnapshot> {
        let statuses = manager.get_all_statuses();
        let mut state = self.state.write();
        let total_capital = state.total_capital;

        let mut snapshots = Vec::with_capacity(statuses.len());
        let mut total_pnl = Decimal::ZERO;

        for status in statuses {
            let entry = state.allocations.get(&status.strategy_id).cloned().unwrap_or(AllocationEntry {
                min_allocation: Decimal::ZERO,
                max_allocation: Decimal::ZERO,
                allocation: Decimal::ZERO,
            });
            total_pnl += status.realized_pnl + status.unrealized_pnl;
            snapshots.push(StrategyAllocationSnapshot {
                strategy_id: status.strategy_id,
                allocation: entry.allocation,
                allocated_capital: entry.allocation * total_capital,
                realized_pnl: status.realized_pnl,
                unrealized_pnl: status.unrealized_pnl,
                position_size: status.position_size,
                exposure_value: status.exposure_value,
                active: status.active,
            });
        }

        state.pnl_history.push(total_pnl);
        let max_history = state.max_pnl_history;
        if state.pnl_history.len() > max_history {
            let overflow = state.pnl_history.len() - max_history;
            state.pnl_history.drain(0..overflow);
        }

        snapshots
    }

    /// Redistributes allocation to equal weight `1/N`, clamped per-strategy
    /// to `[min_allocation, max_allocation]`.
    pub fn rebalance(&self) -> Result<(), ManagerError> {
        let mut state = self.state.write();
        let n = state.allocations.len();
        if n == 0 {
            return Err(ManagerError::State("no strategies registered to rebalance".into()));
        }

        let equal_weight = Decimal::ONE / Decimal::from(n as u64);
        for entry in state.allocations.values_mut() {
            entry.allocation = equal_weight.clamp(entry.min_allocation, entry.max_allocation);
        }
        Ok(())
    }

    /// Pearson correlation of P&L return series between every pair of
    /// strategies, with 1.0 on the diagonal. Requires `enable_correlation_calc`
    /// and at least two strategies with return history.
    pub fn calculate_correlation(
        &self,
        returns_by_strategy: &HashMap<String, Vec<f64>>,
    ) -> Result<HashMap<(String, String), f64>, ManagerError> {
        if !self.enable_correlation_calc {
            return Err(ManagerError::Config("correlation calculation is disabled".into()));
        }
        if returns_by_strategy.len() < 2 {
            return Err(ManagerError::State(
                "correlation requires at least 2 strategies".into(),
            ));
        }

        let ids: Vec<&String> = returns_by_strategy.keys().collect();
        let mut matrix = HashMap::new();
        for &a in &ids {
            matrix.insert((a.clone(), a.clone()), 1.0);
        }

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let a = ids[i];
                let b = ids[j];
                let ra = &returns_by_strategy[a];
                let rb = &returns_by_strategy[b];
                let corr = pearson_correlation(ra, rb);
                matrix.insert((a.clone(), b.clone()), corr);
                matrix.insert((b.clone(), a.clone()), corr);
            }
        }

        Ok(matrix)
    }

    /// Invokes a flatten request on every strategy managed by `manager`.
    pub fn trigger_global_flatten(&self, manager: &StrategyManager, reason: &str, now: DateTime<Utc>) {
        manager.trigger_global_flatten(reason, now);
    }

    /// A Sharpe-like ratio derived from the differenced P&L history:
    /// mean(returns) / stddev(returns), or 0 when history is too short or
    /// flat.
    pub fn sharpe_like_ratio(&self) -> f64 {
        let state = self.state.read();
        if state.pnl_history.len() < 3 {
            return 0.0;
        }

        let returns: Vec<f64> = state
            .pnl_history
            .windows(2)
            .map(|w| (w[1] - w[0]).to_string().parse().unwrap_or(0.0))
            .collect();

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let stddev = variance.sqrt();
        if stddev < f64::EPSILON {
            return 0.0;
        }
        mean / stddev
    }

    pub fn allocation(&self, strategy_id: &str) -> Option<Decimal> {
        self.state
            .read()
            .allocations
            .get(strategy_id)
            .map(|entry| entry.allocation)
    }

    pub fn total_allocated(&self) -> Decimal {
        self.state.read().allocations.values().map(|e| e.allocation).sum()
    }
}

fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < f64::EPSILON || var_b < f64::EPSILON {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn add_strategy_rejects_total_over_one() {
        let pm = PortfolioManager::new(dec!(100_000), true);
        pm.add_strategy("s1", dec!(0), dec!(0.6)).unwrap();
        let err = pm.add_strategy("s2", dec!(0), dec!(0.5)).unwrap_err();
        assert!(matches!(err, ManagerError::Limit(_)));
    }

    #[test]
    fn add_strategy_rejects_inverted_bounds() {
        let pm = PortfolioManager::new(dec!(100_000), true);
        let err = pm.add_strategy("s1", dec!(0.5), dec!(0.2)).unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn rebalance_splits_equal_weight_within_clamps() {
        let pm = PortfolioManager::new(dec!(100_000), true);
        pm.add_strategy("s1", dec!(0), dec!(1)).unwrap();
        pm.add_strategy("s2", dec!(0), dec!(0.3)).unwrap();
        pm.rebalance().unwrap();
        assert_eq!(pm.allocation("s1").unwrap(), dec!(0.5));
        // s2 clamped to its max of 0.3 since equal weight (0.5) exceeds it.
        assert_eq!(pm.allocation("s2").unwrap(), dec!(0.3));
    }

    #[test]
    fn rebalance_with_no_strategies_is_a_state_error() {
        let pm = PortfolioManager::new(dec!(100_000), true);
        assert!(matches!(pm.rebalance().unwrap_err(), ManagerError::State(_)));
    }

    #[test]
    fn correlation_requires_flag_and_two_series() {
        let pm = PortfolioManager::new(dec!(100_000), false);
        let mut returns = HashMap::new();
        returns.insert("s1".to_string(), vec![0.1, 0.2, -0.1]);
        returns.insert("s2".to_string(), vec![0.1, 0.2, -0.1]);
        assert!(matches!(
            pm.calculate_correlation(&returns).unwrap_err(),
            ManagerError::Config(_)
        ));

        let pm = PortfolioManager::new(dec!(100_000), true);
        let perfectly_correlated: HashMap<String, Vec<f64>> = returns.clone();
        let matrix = pm.calculate_correlation(&perfectly_correlated).unwrap();
        assert_eq!(matrix[&("s1".to_string(), "s1".to_string())], 1.0);
        assert!((matrix[&("s1".to_string(), "s2".to_string())] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sharpe_like_ratio_is_zero_with_short_history() {
        let pm = PortfolioManager::new(dec!(100_000), true);
        assert_eq!(pm.sharpe_like_ratio(), 0.0);
    }
}
