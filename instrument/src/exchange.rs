//! Exchange abstractions and identifiers.
//!
//! This module provides the `ExchangeId` enum used throughout the system to
//! identify a trading venue, plus a lightweight `Exchange` trait for venue
//! metadata and capabilities.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifies the trading venue an instrument or order belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum ExchangeId {
    /// Brazilian Stock Exchange (B3)
    B3,
    /// Mock exchange for unit tests
    Mock,
    /// Simulated exchange for dry-run / paper trading
    Simulated,
}

impl ExchangeId {
    /// Returns true if this is a Brazilian exchange.
    pub fn is_brazilian(&self) -> bool {
        matches!(self, ExchangeId::B3)
    }

    /// Returns true if this is a testing/simulation venue.
    pub fn is_test(&self) -> bool {
        matches!(self, ExchangeId::Mock | ExchangeId::Simulated)
    }

    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::B3 => "B3",
            ExchangeId::Mock => "MOCK",
            ExchangeId::Simulated => "SIMULATED",
        }
    }
}

impl FromStr for ExchangeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "B3" => Ok(ExchangeId::B3),
            "MOCK" => Ok(ExchangeId::Mock),
            "SIMULATED" => Ok(ExchangeId::Simulated),
            _ => Err(()),
        }
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ExchangeId {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or(ExchangeId::Mock)
    }
}

/// Venue metadata and capabilities.
pub trait Exchange {
    type ExchangeId;

    fn id(&self) -> Self::ExchangeId;
    fn name(&self) -> &'static str;

    fn supports_market_data(&self) -> bool {
        true
    }

    fn supports_trading(&self) -> bool {
        true
    }

    fn is_operational(&self) -> bool {
        true
    }
}

/// Brazilian Stock Exchange (B3) venue.
#[derive(Debug, Clone)]
pub struct B3Exchange;

impl Exchange for B3Exchange {
    type ExchangeId = ExchangeId;

    fn id(&self) -> Self::ExchangeId {
        ExchangeId::B3
    }

    fn name(&self) -> &'static str {
        "Brasil Bolsa Balcão"
    }
}

/// In-memory venue used by tests and paper-trading runs.
#[derive(Debug, Clone)]
pub struct MockExchange;

impl Exchange for MockExchange {
    type ExchangeId = ExchangeId;

    fn id(&self) -> Self::ExchangeId {
        ExchangeId::Mock
    }

    fn name(&self) -> &'static str {
        "Mock Exchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_classification() {
        assert!(ExchangeId::B3.is_brazilian());
        assert!(!ExchangeId::B3.is_test());

        assert!(!ExchangeId::Mock.is_brazilian());
        assert!(ExchangeId::Mock.is_test());
    }

    #[test]
    fn exchange_id_string_conversion() {
        assert_eq!(ExchangeId::B3.as_str(), "B3");
        assert_eq!(ExchangeId::B3.to_string(), "B3");

        assert_eq!(ExchangeId::from_str("b3").unwrap(), ExchangeId::B3);
        assert_eq!(
            ExchangeId::from_str("simulated").unwrap(),
            ExchangeId::Simulated
        );
        assert!(ExchangeId::from_str("invalid").is_err());
    }

    #[test]
    fn exchange_implementations() {
        let b3 = B3Exchange;
        assert_eq!(b3.id(), ExchangeId::B3);
        assert!(b3.supports_market_data());
        assert!(b3.supports_trading());

        let mock = MockExchange;
        assert_eq!(mock.id(), ExchangeId::Mock);
    }
}
