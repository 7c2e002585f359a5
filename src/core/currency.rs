use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code.
///
/// Supports standard fiat currencies (USD, BRL, EUR, etc.) as well as
/// arbitrary identifiers for experimental settlement units.
///
/// # Examples
///
/// ```
/// use credit_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let brl = CurrencyCode::new("BRL");
/// assert_ne!(usd, brl);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_equality() {
        let a = CurrencyCode::new("USD");
        let b = CurrencyCode::new("USD");
        let c = CurrencyCode::new("BRL");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_currency_display() {
        let c = CurrencyCode::new("BRL");
        assert_eq!(format!("{}", c), "BRL");
    }
}
