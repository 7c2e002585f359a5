use crate::core::currency::CurrencyCode;
use crate::core::settlement::Version;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors arising from exchange-rate operations.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("no exchange rate available for {from} -> {to}")]
    NotFound {
        from: CurrencyCode,
        to: CurrencyCode,
    },
    #[error("exchange rate must be positive, got {rate} for {from} -> {to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
    },
}

/// An exchange rate between two currencies at a point in time.
///
/// Each direction is a separate record: a stored USD→BRL rate says nothing
/// about BRL→USD. Rates carry a validity window — a rate is usable at
/// instant `t` iff `effective_date <= t` and `expires_at` (when present)
/// is after `t`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    id: Uuid,
    from: CurrencyCode,
    to: CurrencyCode,
    rate: Decimal,
    effective_date: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    source: String,
    updated_at: DateTime<Utc>,
    version: Version,
}

impl ExchangeRate {
    pub fn new(
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
        effective_date: DateTime<Utc>,
        source: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate { from, to, rate });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from,
            to,
            rate,
            effective_date,
            expires_at,
            source: source.into(),
            updated_at: effective_date,
            version: Version::default(),
        })
    }

    /// In-place update used by the upsert path: new rate and source, with
    /// the effective date reset to `now`.
    pub fn update(
        &mut self,
        rate: Decimal,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate {
                from: self.from.clone(),
                to: self.to.clone(),
                rate,
            });
        }
        self.rate = rate;
        self.source = source.into();
        self.effective_date = now;
        self.updated_at = now;
        Ok(())
    }

    /// Whether this rate's validity window covers the given instant.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.effective_date <= at && self.expires_at.map_or(true, |expires| expires > at)
    }

    pub(crate) fn bump_version(&mut self) {
        self.version = self.version.next();
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn from(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn to(&self) -> &CurrencyCode {
        &self.to
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn effective_date(&self) -> DateTime<Utc> {
        self.effective_date
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn usd_brl(rate: Decimal, effective: DateTime<Utc>) -> ExchangeRate {
        ExchangeRate::new(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            rate,
            effective,
            "manual",
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let err = ExchangeRate::new(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            dec!(-0.5),
            Utc::now(),
            "manual",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RateError::InvalidRate { .. }));
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let rate = usd_brl(dec!(5.75), now - Duration::hours(1));
        assert!(rate.is_valid_at(now));

        // Effective date in the future — not yet valid.
        let future = usd_brl(dec!(5.75), now + Duration::hours(1));
        assert!(!future.is_valid_at(now));
    }

    #[test]
    fn test_expired_rate_is_invalid() {
        let now = Utc::now();
        let rate = ExchangeRate::new(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            dec!(5.75),
            now - Duration::days(2),
            "manual",
            Some(now - Duration::days(1)),
        )
        .unwrap();
        assert!(!rate.is_valid_at(now));
        assert!(rate.is_valid_at(now - Duration::days(1) - Duration::hours(1)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let rate = ExchangeRate::new(
            CurrencyCode::new("USD"),
            CurrencyCode::new("BRL"),
            dec!(5.75),
            now - Duration::days(1),
            "manual",
            Some(now),
        )
        .unwrap();
        // expires_at == query instant: no longer valid.
        assert!(!rate.is_valid_at(now));
    }

    #[test]
    fn test_update_resets_effective_date() {
        let created = Utc::now() - Duration::days(7);
        let mut rate = usd_brl(dec!(5.50), created);
        let now = Utc::now();
        rate.update(dec!(5.75), "treasury-desk", now).unwrap();

        assert_eq!(rate.rate(), dec!(5.75));
        assert_eq!(rate.source(), "treasury-desk");
        assert_eq!(rate.effective_date(), now);
    }

    #[test]
    fn test_update_rejects_non_positive_rate() {
        let mut rate = usd_brl(dec!(5.50), Utc::now());
        let err = rate.update(Decimal::ZERO, "manual", Utc::now()).unwrap_err();
        assert!(matches!(err, RateError::InvalidRate { .. }));
        assert_eq!(rate.rate(), dec!(5.50));
    }
}
