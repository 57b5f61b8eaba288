//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as [`Decimal`] so that subtotals never pick up binary
//! floating point drift. On the wire (and in the persisted cart blob) a price
//! is a plain JSON number, e.g. `19.99`.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount has more precision than a stored price keeps.
    #[error("price {0} cannot be stored without rounding")]
    TooPrecise(Decimal),
}

/// A non-negative price in the store's currency.
///
/// Currency handling is out of scope for the cart: every price is in the
/// single currency the catalog is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooPrecise`] if it would not read back unchanged from
    /// its JSON number form.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if !survives_float(amount) {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents.
    ///
    /// ```
    /// use go_marketplace_core::Price;
    ///
    /// assert_eq!(Price::from_cents(1999).to_string(), "19.99");
    /// ```
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, saturating at the largest representable amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Add two prices, saturating at the largest representable amount.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.checked_add(other.0).unwrap_or(Decimal::MAX))
    }
}

/// Whether `amount` reads back as itself after the trip through `f64` that
/// the JSON encoding takes.
fn survives_float(amount: Decimal) -> bool {
    amount
        .to_f64()
        .and_then(|float| float.to_string().parse::<Decimal>().ok())
        == Some(amount)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        let result = Price::new(Decimal::new(-1, 0));
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_rejects_more_digits_than_f64_holds() {
        let large = "12345678901234567.89".parse::<Decimal>().unwrap();
        assert_eq!(Price::new(large), Err(PriceError::TooPrecise(large)));

        let fine = "0.1234567890123456789".parse::<Decimal>().unwrap();
        assert_eq!(Price::new(fine), Err(PriceError::TooPrecise(fine)));
    }

    #[test]
    fn test_accepted_prices_reload_unchanged() {
        for raw in ["19.99", "0.01", "10", "1234567.5", "0"] {
            let price = Price::new(raw.parse::<Decimal>().unwrap()).unwrap();
            let json = serde_json::to_string(&price).unwrap();
            assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), price, "{raw}");
        }
    }

    #[test]
    fn test_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_value(Price::from_cents(1999)).unwrap();
        assert!(json.is_number());
        assert!((json.as_f64().unwrap() - 19.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserializes_integer_and_float() {
        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole, Price::from_cents(1000));

        let fractional: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(fractional, Price::from_cents(1999));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::from_cents(250).times(3), Price::from_cents(750));
        assert_eq!(Price::from_cents(250).times(0), Price::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(1000).to_string(), "10.00");
    }
}
