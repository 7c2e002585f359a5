use crate::core::currency::CurrencyCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A rate quote returned by an external FX source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxQuote {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

/// External FX-rate source, injected as a narrow capability.
///
/// Implementations own their retry/back-off/circuit-breaking and return
/// `None` on unavailability or timeout instead of failing — the engine
/// treats `None` as a normal degraded outcome: the refresh is skipped and
/// manually upserted rates remain usable.
pub trait FxRateProvider: Send + Sync {
    fn fetch(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<FxQuote>;
}

/// Fixed-table provider for demos and tests.
#[derive(Debug, Default)]
pub struct StaticRateProvider {
    quotes: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
    source: String,
}

impl StaticRateProvider {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            quotes: HashMap::new(),
            source: source.into(),
        }
    }

    pub fn with_quote(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.quotes.insert((from, to), rate);
        self
    }
}

impl FxRateProvider for StaticRateProvider {
    fn fetch(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<FxQuote> {
        self.quotes
            .get(&(from.clone(), to.clone()))
            .map(|&rate| FxQuote {
                from: from.clone(),
                to: to.clone(),
                rate,
                source: self.source.clone(),
                fetched_at: Utc::now(),
            })
    }
}

/// Provider that is always unavailable. Stands in for an external source
/// whose circuit breaker is open.
#[derive(Debug, Default)]
pub struct UnavailableProvider;

impl FxRateProvider for UnavailableProvider {
    fn fetch(&self, _from: &CurrencyCode, _to: &CurrencyCode) -> Option<FxQuote> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_static_provider_returns_registered_quote() {
        let provider = StaticRateProvider::new("fixture").with_quote(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            dec!(5.75),
        );
        let quote = provider
            .fetch(&CurrencyCode::new("USD"), &CurrencyCode::new("BRL"))
            .unwrap();
        assert_eq!(quote.rate, dec!(5.75));
        assert_eq!(quote.source, "fixture");
    }

    #[test]
    fn test_static_provider_has_no_reverse_pair() {
        let provider = StaticRateProvider::new("fixture").with_quote(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            dec!(5.75),
        );
        assert!(provider
            .fetch(&CurrencyCode::new("BRL"), &CurrencyCode::new("USD"))
            .is_none());
    }

    #[test]
    fn test_unavailable_provider() {
        assert!(UnavailableProvider
            .fetch(&CurrencyCode::new("USD"), &CurrencyCode::new("BRL"))
            .is_none());
    }
}
