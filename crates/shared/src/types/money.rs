//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major currency units.
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "ARS").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
///
/// The petty-cash pool operates in pesos; USD exists for the occasional
/// dollar-denominated injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Argentine Peso
    Ars,
    /// US Dollar
    Usd,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ars => write!(f, "ARS"),
            Self::Usd => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ARS" => Ok(Self::Ars),
            "USD" => Ok(Self::Usd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let amount = dec!(100_000);
        let money = Money::new(amount, Currency::Ars);
        assert_eq!(money.amount, amount);
        assert_eq!(money.currency, Currency::Ars);
    }

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Ars);
        assert!(money.is_zero());
        assert!(!money.is_positive());
        assert_eq!(money.amount, Decimal::ZERO);
    }

    #[test]
    fn test_money_is_positive() {
        assert!(Money::new(dec!(10), Currency::Ars).is_positive());
        assert!(!Money::new(dec!(0), Currency::Ars).is_positive());
        assert!(!Money::new(dec!(-10), Currency::Ars).is_positive());
    }

    #[test]
    fn test_money_is_negative() {
        assert!(Money::new(dec!(-10), Currency::Usd).is_negative());
        assert!(!Money::new(dec!(10), Currency::Usd).is_negative());
        assert!(!Money::new(dec!(0), Currency::Usd).is_negative());
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Ars.to_string(), "ARS");
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("ARS").unwrap(), Currency::Ars);
        assert_eq!(Currency::from_str("ars").unwrap(), Currency::Ars);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);

        assert!(Currency::from_str("EUR").is_err());
        assert!(Currency::from_str("").is_err());
    }
}
