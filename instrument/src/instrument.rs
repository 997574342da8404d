//! Instrument definitions: the immutable contract specification every
//! strategy and execution component keys its state by.

use crate::exchange::ExchangeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An instrument's contract specification: symbol, tick size, multiplier and
/// venue. Immutable once constructed — strategies and execution components
/// key their per-instrument state off a clone of this value, never a mutable
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    symbol: String,
    tick_size: Decimal,
    multiplier: i64,
    venue: ExchangeId,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        tick_size: Decimal,
        multiplier: i64,
        venue: ExchangeId,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size,
            multiplier,
            venue,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    pub fn venue(&self) -> ExchangeId {
        self.venue
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.venue)
    }
}

/// Coarse instrument classification, used by contract-spec lookups that want
/// to discriminate without matching on symbol strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Spot,
    Future,
    Option,
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Spot => write!(f, "spot"),
            InstrumentKind::Future => write!(f, "future"),
            InstrumentKind::Option => write!(f, "option"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn instrument_accessors() {
        let i = Instrument::new("ag_F_2_SFE", dec!(0.5), 100, ExchangeId::B3);
        assert_eq!(i.symbol(), "ag_F_2_SFE");
        assert_eq!(i.tick_size(), dec!(0.5));
        assert_eq!(i.multiplier(), 100);
        assert_eq!(i.venue(), ExchangeId::B3);
        assert_eq!(i.to_string(), "ag_F_2_SFE@B3");
    }
}
