//! Tick-size rounding and validation.
//!
//! Prices are `rust_decimal::Decimal` throughout; rounding to a tick is
//! `round(p / tick) * tick`, and validation admits a 1% tolerance on
//! `p mod tick` to absorb floating-point noise carried over from upstream
//! feed handlers.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("tick size must be positive, got {0}")]
    NonPositiveTick(Decimal),
    #[error("price {price} is not a multiple of tick size {tick} (remainder {remainder})")]
    OffTick {
        price: Decimal,
        tick: Decimal,
        remainder: Decimal,
    },
}

/// Stateless tick-size arithmetic.
pub struct PriceMath;

impl PriceMath {
    /// Rounds `price` to the nearest multiple of `tick`.
    pub fn round_to_tick(price: Decimal, tick: Decimal) -> Decimal {
        if tick.is_zero() {
            return price;
        }
        (price / tick).round() * tick
    }

    /// Validates that `price` lies on a tick boundary within a 1% tolerance
    /// of one tick, i.e. `|price mod tick|` is within `0.01 * tick` of `0`
    /// or `tick`.
    pub fn validate_tick(price: Decimal, tick: Decimal) -> Result<(), PriceError> {
        if tick <= Decimal::ZERO {
            return Err(PriceError::NonPositiveTick(tick));
        }
        let remainder = (price % tick).abs();
        let tolerance = tick * Decimal::new(1, 2); // 0.01 * tick
        if remainder <= tolerance || (tick - remainder) <= tolerance {
            Ok(())
        } else {
            Err(PriceError::OffTick {
                price,
                tick,
                remainder,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_nearest_tick() {
        assert_eq!(PriceMath::round_to_tick(dec!(10.27), dec!(0.5)), dec!(10.5));
        assert_eq!(PriceMath::round_to_tick(dec!(10.10), dec!(0.5)), dec!(10.0));
    }

    #[test]
    fn validates_on_tick_price() {
        assert!(PriceMath::validate_tick(dec!(10.5), dec!(0.5)).is_ok());
        assert!(PriceMath::validate_tick(dec!(10.0), dec!(0.5)).is_ok());
    }

    #[test]
    fn rejects_off_tick_price_outside_tolerance() {
        let err = PriceMath::validate_tick(dec!(10.2), dec!(0.5)).unwrap_err();
        assert!(matches!(err, PriceError::OffTick { .. }));
    }

    #[test]
    fn tolerates_small_floating_point_noise() {
        // 0.999% of a 0.5 tick is within tolerance either side of a boundary.
        assert!(PriceMath::validate_tick(dec!(10.4999), dec!(0.5)).is_ok());
    }

    #[test]
    fn rejects_non_positive_tick() {
        assert!(matches!(
            PriceMath::validate_tick(dec!(10.0), dec!(0.0)),
            Err(PriceError::NonPositiveTick(_))
        ));
    }
}
