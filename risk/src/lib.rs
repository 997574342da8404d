#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # 🛡️ Risk - Position and Exposure Limits
//!
//! Per-strategy risk metrics and the limit check every strategy consults
//! before acting on its own signal: `CheckRiskLimits`. Deliberately simpler
//! than a generic order-approval pipeline — this crate answers one question
//! ("is this strategy still within its limits?"), not "should this specific
//! order be approved?".
//!
//! [`check`] holds the reusable, generic [`RiskCheck`] trait and its
//! concrete [`check::CheckHigherThan`] implementation, plus the numeric
//! helper functions risk limit checks are built from.

pub mod check;

pub use check::{CheckHigherThan, CheckHigherThanError, RiskCheck};

use chrono::{DateTime, Utc};
use derive_more::{Constructor, Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Approved result of a risk check.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Display, From, Constructor,
)]
pub struct RiskApproved<T>(pub T);

impl<T> RiskApproved<T> {
    pub fn into_item(self) -> T {
        self.0
    }
}

/// Rejected result of a risk check, carrying the reason.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RiskRefused<T, Reason = String> {
    pub item: T,
    pub reason: Reason,
}

impl<T> RiskRefused<T> {
    pub fn new(item: T, reason: impl Into<String>) -> Self {
        Self {
            item,
            reason: reason.into(),
        }
    }
}

impl<T, Reason> RiskRefused<T, Reason> {
    pub fn into_item(self) -> T {
        self.item
    }
}

/// A strategy's current risk posture, recomputed on every position change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub position_size: Decimal,
    pub max_position_size: Decimal,
    pub exposure_value: Decimal,
    pub max_exposure: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl RiskMetrics {
    pub fn new(max_position_size: Decimal, max_exposure: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            position_size: Decimal::ZERO,
            max_position_size,
            exposure_value: Decimal::ZERO,
            max_exposure,
            timestamp,
        }
    }

    /// Recomputes `position_size`/`exposure_value` from a signed net quantity
    /// and the instrument's current price.
    pub fn update(&mut self, net_qty: Decimal, price: Decimal, timestamp: DateTime<Utc>) {
        self.position_size = net_qty.abs();
        self.exposure_value = self.position_size * price;
        self.timestamp = timestamp;
    }

    /// Returns false if either the position-size or exposure limit is breached.
    pub fn check_risk_limits(&self) -> bool {
        self.position_size <= self.max_position_size && self.exposure_value <= self.max_exposure
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
    fn within_limits_passes() {
        let mut metrics = RiskMetrics::new(dec!(100), dec!(100_000), now());
        metrics.update(dec!(10), dec!(50), now());
        assert!(metrics.check_risk_limits());
    }

    #[test]
    fn position_size_limit_breach_fails() {
        let mut metrics = RiskMetrics::new(dec!(100), dec!(100_000), now());
        metrics.update(dec!(150), dec!(50), now());
        assert!(!metrics.check_risk_limits());
    }

    #[test]
    fn exposure_limit_breach_fails() {
        let mut metrics = RiskMetrics::new(dec!(1000), dec!(1000), now());
        metrics.update(dec!(50), dec!(100), now());
        assert!(!metrics.check_risk_limits());
    }

    #[test]
    fn negative_net_quantity_uses_absolute_size() {
        let mut metrics = RiskMetrics::new(dec!(100), dec!(100_000), now());
        metrics.update(dec!(-30), dec!(50), now());
        assert_eq!(metrics.position_size, dec!(30));
        assert!(metrics.check_risk_limits());
    }
}
