use crate::core::currency::CurrencyCode;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fractional digits carried internally by every [`Money`] value.
pub const INTERNAL_SCALE: u32 = 8;

/// Fractional digits of settlement figures at the persistence/display boundary.
pub const SETTLEMENT_SCALE: u32 = 2;

/// Errors arising from monetary arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("money amount cannot be negative, got {0}")]
    InvalidAmount(Decimal),
    #[error("cannot operate on different currencies: {left} and {right}")]
    CurrencyMismatch {
        left: CurrencyCode,
        right: CurrencyCode,
    },
    #[error("division by zero in money calculation")]
    DivisionByZero,
    #[error("exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),
}

/// Immutable monetary value tagged with its currency.
///
/// Amounts are decimal (never floating point) and are normalized to
/// 8 fractional digits at construction so that chained operations do not
/// accumulate precision loss. The 2-decimal settlement figure is produced
/// only at the boundary via [`Money::settlement_amount`].
///
/// Every operation returns a new value; arithmetic between two `Money`
/// values requires identical currencies.
///
/// # Examples
///
/// ```
/// use credit_engine::core::currency::CurrencyCode;
/// use credit_engine::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let a = Money::new(dec!(100), CurrencyCode::new("BRL")).unwrap();
/// let b = Money::new(dec!(50), CurrencyCode::new("BRL")).unwrap();
/// assert_eq!(a.add(&b).unwrap().amount(), dec!(150));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    /// Create a new monetary value, normalized to 8 fractional digits
    /// (round half away from zero).
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(amount));
        }
        Ok(Self {
            amount: amount
                .round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointAwayFromZero),
            currency,
        })
    }

    /// Zero in the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Money::new(self.amount + other.amount, self.currency.clone())
    }

    /// Subtract `other` from `self`. Fails with `InvalidAmount` when the
    /// result would be negative — this domain has no negative money.
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Money::new(self.amount - other.amount, self.currency.clone())
    }

    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        Money::new(self.amount * factor, self.currency.clone())
    }

    pub fn divide(&self, divisor: Decimal) -> Result<Money, MoneyError> {
        if divisor == Decimal::ZERO {
            return Err(MoneyError::DivisionByZero);
        }
        Money::new(self.amount / divisor, self.currency.clone())
    }

    /// Re-denominate this value in `target` currency at the given rate.
    pub fn convert_to(
        &self,
        target: CurrencyCode,
        exchange_rate: Decimal,
    ) -> Result<Money, MoneyError> {
        if exchange_rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate(exchange_rate));
        }
        Money::new(self.amount * exchange_rate, target)
    }

    /// Amount rounded to 2 decimal places (half away from zero) for
    /// settlement records and display.
    pub fn settlement_amount(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(SETTLEMENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn brl(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("BRL")).unwrap()
    }

    #[test]
    fn test_construction_sets_amount_and_currency() {
        let m = brl(dec!(100));
        assert_eq!(m.amount(), dec!(100));
        assert_eq!(m.currency().as_str(), "BRL");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Money::new(dec!(-1), CurrencyCode::new("BRL")).unwrap_err();
        assert_eq!(err, MoneyError::InvalidAmount(dec!(-1)));
    }

    #[test]
    fn test_construction_rounds_to_internal_scale() {
        let m = Money::new(dec!(1.123456789), CurrencyCode::new("BRL")).unwrap();
        assert_eq!(m.amount(), dec!(1.12345679));
    }

    #[test]
    fn test_add_same_currency() {
        let sum = brl(dec!(100)).add(&brl(dec!(50))).unwrap();
        assert_eq!(sum.amount(), dec!(150));
    }

    #[test]
    fn test_add_different_currency_fails() {
        let usd = Money::new(dec!(50), CurrencyCode::new("USD")).unwrap();
        let err = brl(dec!(100)).add(&usd).unwrap_err();
        assert!(matches!(err, MoneyError::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_subtract() {
        let diff = brl(dec!(200)).subtract(&brl(dec!(50))).unwrap();
        assert_eq!(diff.amount(), dec!(150));
    }

    #[test]
    fn test_subtract_below_zero_fails() {
        let err = brl(dec!(50)).subtract(&brl(dec!(100))).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(_)));
    }

    #[test]
    fn test_multiply() {
        let m = brl(dec!(100)).multiply(dec!(2.5)).unwrap();
        assert_eq!(m.amount(), dec!(250));
    }

    #[test]
    fn test_divide() {
        let m = brl(dec!(300)).divide(dec!(3)).unwrap();
        assert_eq!(m.amount(), dec!(100));
    }

    #[test]
    fn test_divide_by_zero_fails() {
        let err = brl(dec!(100)).divide(Decimal::ZERO).unwrap_err();
        assert_eq!(err, MoneyError::DivisionByZero);
    }

    #[test]
    fn test_convert_to_multiplies_by_rate() {
        let usd = Money::new(dec!(100), CurrencyCode::new("USD")).unwrap();
        let converted = usd.convert_to(CurrencyCode::new("BRL"), dec!(5.75)).unwrap();
        assert_eq!(converted.amount(), dec!(575));
        assert_eq!(converted.currency().as_str(), "BRL");
    }

    #[test]
    fn test_convert_to_rate_one_preserves_amount() {
        let m = brl(dec!(1000));
        let converted = m.convert_to(CurrencyCode::new("USD"), Decimal::ONE).unwrap();
        assert_eq!(converted.amount(), dec!(1000));
        assert_eq!(converted.currency().as_str(), "USD");
    }

    #[test]
    fn test_convert_to_non_positive_rate_fails() {
        let m = brl(dec!(100));
        assert!(matches!(
            m.convert_to(CurrencyCode::new("USD"), Decimal::ZERO),
            Err(MoneyError::InvalidRate(_))
        ));
        assert!(matches!(
            m.convert_to(CurrencyCode::new("USD"), dec!(-1)),
            Err(MoneyError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_settlement_amount_rounds_half_away_from_zero() {
        assert_eq!(brl(dec!(100.125)).settlement_amount(), dec!(100.13));
        assert_eq!(brl(dec!(100.124)).settlement_amount(), dec!(100.12));
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(brl(dec!(100)), brl(dec!(100)));
        let usd = Money::new(dec!(100), CurrencyCode::new("USD")).unwrap();
        assert_ne!(brl(dec!(100)), usd);
    }
}
