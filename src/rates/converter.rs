use crate::core::currency::CurrencyCode;
use crate::core::money::{Money, MoneyError};
use rust_decimal::Decimal;

/// Applies a resolved exchange rate to a monetary value.
///
/// Thin wrapper over [`Money::convert_to`]; kept as a separate seam so the
/// orchestrator's rate sourcing can be tested independently of the
/// arithmetic.
#[derive(Debug, Default)]
pub struct CurrencyConverter;

impl CurrencyConverter {
    pub fn convert(
        &self,
        value: &Money,
        target: CurrencyCode,
        rate: Decimal,
    ) -> Result<Money, MoneyError> {
        value.convert_to(target, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_applies_rate_and_retags_currency() {
        let usd = Money::new(dec!(100), CurrencyCode::new("USD")).unwrap();
        let brl = CurrencyConverter
            .convert(&usd, CurrencyCode::new("BRL"), dec!(5.75))
            .unwrap();
        assert_eq!(brl.amount(), dec!(575));
        assert_eq!(brl.currency().as_str(), "BRL");
    }

    #[test]
    fn test_convert_rejects_non_positive_rate() {
        let usd = Money::new(dec!(100), CurrencyCode::new("USD")).unwrap();
        let err = CurrencyConverter
            .convert(&usd, CurrencyCode::new("BRL"), dec!(0))
            .unwrap_err();
        assert!(matches!(err, MoneyError::InvalidRate(_)));
    }
}
