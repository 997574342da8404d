//! Contract-spec registry: symbol -> [`Instrument`] lookup.
//!
//! Grounded on the same dual-index idiom `vantage_execution::OrderPriceMap`
//! uses for its id index — a small `HashMap` wrapper rather than a generic
//! multi-key-parameterized map, since this crate has only one lookup key.

use crate::instrument::Instrument;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no contract spec registered for symbol {0}")]
    UnknownSymbol(String),
    #[error("symbol {0} is already registered")]
    DuplicateSymbol(String),
}

/// Holds the contract specification for every instrument a strategy or the
/// execution layer may reference by symbol.
#[derive(Debug, Default, Clone)]
pub struct InstrumentRegistry {
    by_symbol: HashMap<String, Instrument>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instrument: Instrument) -> Result<(), RegistryError> {
        let symbol = instrument.symbol().to_string();
        if self.by_symbol.contains_key(&symbol) {
            return Err(RegistryError::DuplicateSymbol(symbol));
        }
        self.by_symbol.insert(symbol, instrument);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Result<&Instrument, RegistryError> {
        self.by_symbol
            .get(symbol)
            .ok_or_else(|| RegistryError::UnknownSymbol(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ExchangeId;
    use rust_decimal_macros::dec;

    fn sample(symbol: &str) -> Instrument {
        Instrument::new(symbol, dec!(0.5), 100, ExchangeId::B3)
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = InstrumentRegistry::new();
        registry.register(sample("ag_F_2_SFE")).unwrap();

        assert!(registry.contains("ag_F_2_SFE"));
        assert_eq!(registry.get("ag_F_2_SFE").unwrap().symbol(), "ag_F_2_SFE");
    }

    #[test]
    fn unknown_symbol_errors() {
        let registry = InstrumentRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = InstrumentRegistry::new();
        registry.register(sample("ag_F_2_SFE")).unwrap();
        assert!(matches!(
            registry.register(sample("ag_F_2_SFE")),
            Err(RegistryError::DuplicateSymbol(_))
        ));
    }
}
