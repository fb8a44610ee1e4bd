//! Two-scale money amounts.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// A non-negative monetary amount with exactly two fractional digits.
///
/// Stores persist amounts as integer minor units (cents); see
/// [`Money::cents`] and [`Money::from_cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Validate a decimal amount.
    ///
    /// Rejects negative amounts, amounts with more than two fractional
    /// digits, and amounts whose cent count does not fit in an `i64`.
    /// Amounts with fewer digits are rescaled.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::InvalidAmount {
                amount: amount.to_string(),
                reason: "amount is negative",
            });
        }
        let normalized = amount.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(ValidationError::InvalidAmount {
                amount: amount.to_string(),
                reason: "more than two fractional digits",
            });
        }
        let mut scaled = normalized;
        scaled.rescale(MONEY_SCALE);
        if scaled.scale() != MONEY_SCALE || i64::try_from(scaled.mantissa()).is_err() {
            return Err(ValidationError::InvalidAmount {
                amount: amount.to_string(),
                reason: "too large to store in minor units",
            });
        }
        Ok(Money(scaled))
    }

    /// Build an amount from integer minor units.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        Self::new(Decimal::new(cents, MONEY_SCALE))
    }

    /// Amount in integer minor units.
    pub fn cents(&self) -> i64 {
        // Scale is pinned to two digits and `new` bounds the mantissa to i64.
        self.0.mantissa() as i64
    }

    /// The underlying decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| ValidationError::InvalidAmount {
            amount: s.to_string(),
            reason: "not a decimal number",
        })?;
        Money::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescales_whole_amounts() {
        let money: Money = "1050".parse().unwrap();
        assert_eq!(money.to_string(), "1050.00");
        assert_eq!(money.cents(), 105_000);
    }

    #[test]
    fn test_cents_roundtrip() {
        let money = Money::from_cents(2_599).unwrap();
        assert_eq!(money.to_string(), "25.99");
        assert_eq!(money.cents(), 2_599);
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        let money: Money = "12.5000".parse().unwrap();
        assert_eq!(money.cents(), 1_250);
    }

    #[test]
    fn test_rejects_three_digits() {
        let err = "1.005".parse::<Money>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAmount { .. }));
    }

    #[test]
    fn test_rejects_negative() {
        assert!(Money::from_cents(-1).is_err());
        assert!("-0.00".parse::<Money>().is_ok());
    }

    #[test]
    fn test_rejects_amounts_beyond_cent_range() {
        let largest: Money = "92233720368547758.07".parse().unwrap();
        assert_eq!(largest.cents(), i64::MAX);

        let err = "92233720368547758.08".parse::<Money>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAmount { .. }));
        assert!("100000000000000000".parse::<Money>().is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("ten dollars".parse::<Money>().is_err());
    }

    #[test]
    fn test_ordering() {
        let small: Money = "99.99".parse().unwrap();
        let large: Money = "100".parse().unwrap();
        assert!(small < large);
    }
}
