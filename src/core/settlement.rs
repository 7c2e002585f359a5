use crate::core::currency::CurrencyCode;
use crate::core::pricing::PricingResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle states of a settlement.
///
/// ```text
/// Pending ──> Settled            (terminal)
///    │
///    └──> Failed ──> Cancelled   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Pending,
    Settled,
    Failed,
    Cancelled,
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementStatus::Pending => write!(f, "Pending"),
            SettlementStatus::Settled => write!(f, "Settled"),
            SettlementStatus::Failed => write!(f, "Failed"),
            SettlementStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Errors arising from illegal settlement transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("cannot settle a transaction in status '{0}'")]
    InvalidState(SettlementStatus),
    #[error("transaction is already settled")]
    AlreadySettled,
}

/// Opaque optimistic-concurrency token.
///
/// Storage bumps the token on every committed update; writers present the
/// token they read, and a mismatch is reported as a concurrency conflict
/// rather than silently overwriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Version(u32);

impl Version {
    pub fn next(self) -> Version {
        Version(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Persisted record of a priced-and-settled receivable.
///
/// Carries a frozen snapshot of the pricing computation (monetary figures
/// at settlement precision, 2 decimals) plus the settlement state machine.
/// State is only mutated through the transition methods; there are no raw
/// setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    id: Uuid,
    receivable_id: Uuid,

    // Pricing inputs
    face_value: Decimal,
    face_currency: CurrencyCode,
    base_rate: Decimal,
    applied_spread: Decimal,
    term_in_months: i32,

    // Pricing outputs
    present_value: Decimal,
    discount: Decimal,
    payment_currency: CurrencyCode,
    net_disbursement: Decimal,
    exchange_rate_applied: Decimal,

    status: SettlementStatus,
    settled_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: Version,
}

impl Settlement {
    /// Create a `Pending` settlement from a sealed pricing result.
    pub fn pending(receivable_id: Uuid, pricing: &PricingResult, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            receivable_id,
            face_value: pricing.face_value().settlement_amount(),
            face_currency: pricing.face_value().currency().clone(),
            base_rate: pricing.base_rate(),
            applied_spread: pricing.applied_spread(),
            term_in_months: pricing.term_in_months(),
            present_value: pricing.present_value().settlement_amount(),
            discount: pricing.discount().settlement_amount(),
            payment_currency: pricing.net_disbursement().currency().clone(),
            net_disbursement: pricing.net_disbursement().settlement_amount(),
            exchange_rate_applied: pricing.exchange_rate_applied(),
            status: SettlementStatus::Pending,
            settled_at: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            version: Version::default(),
        }
    }

    /// Pending → Settled. Any other current state is an invalid transition.
    pub fn mark_settled(&mut self, now: DateTime<Utc>) -> Result<(), SettlementError> {
        if self.status != SettlementStatus::Pending {
            return Err(SettlementError::InvalidState(self.status));
        }
        self.status = SettlementStatus::Settled;
        self.settled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Transition to Failed, recording the reason. Refused once settled.
    pub fn mark_failed(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SettlementError> {
        if self.status == SettlementStatus::Settled {
            return Err(SettlementError::AlreadySettled);
        }
        self.status = SettlementStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }

    /// Transition to Cancelled. Refused once settled.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), SettlementError> {
        if self.status == SettlementStatus::Settled {
            return Err(SettlementError::AlreadySettled);
        }
        self.status = SettlementStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    pub(crate) fn bump_version(&mut self) {
        self.version = self.version.next();
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn receivable_id(&self) -> Uuid {
        self.receivable_id
    }

    pub fn face_value(&self) -> Decimal {
        self.face_value
    }

    pub fn face_currency(&self) -> &CurrencyCode {
        &self.face_currency
    }

    pub fn base_rate(&self) -> Decimal {
        self.base_rate
    }

    pub fn applied_spread(&self) -> Decimal {
        self.applied_spread
    }

    pub fn term_in_months(&self) -> i32 {
        self.term_in_months
    }

    pub fn present_value(&self) -> Decimal {
        self.present_value
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn payment_currency(&self) -> &CurrencyCode {
        &self.payment_currency
    }

    pub fn net_disbursement(&self) -> Decimal {
        self.net_disbursement
    }

    pub fn exchange_rate_applied(&self) -> Decimal {
        self.exchange_rate_applied
    }

    pub fn is_cross_currency(&self) -> bool {
        self.face_currency != self.payment_currency
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
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
    use crate::core::money::Money;
    use crate::core::pricing::{PricingStrategy, TradeDraftPricing};
    use rust_decimal_macros::dec;

    fn pending() -> Settlement {
        let face = Money::new(dec!(10_000), CurrencyCode::new("BRL")).unwrap();
        let pricing = TradeDraftPricing.calculate(&face, 3, dec!(0.0089)).unwrap();
        Settlement::pending(Uuid::new_v4(), &pricing, Utc::now())
    }

    #[test]
    fn test_pending_snapshot_at_settlement_precision() {
        let s = pending();
        assert_eq!(s.status(), SettlementStatus::Pending);
        assert_eq!(s.face_value(), dec!(10000.00));
        assert_eq!(s.present_value(), dec!(9315.95));
        assert_eq!(s.discount(), dec!(684.05));
        assert_eq!(s.net_disbursement(), dec!(9315.95));
        assert_eq!(s.exchange_rate_applied(), Decimal::ONE);
        assert!(!s.is_cross_currency());
        assert!(s.settled_at().is_none());
    }

    #[test]
    fn test_settle_from_pending() {
        let mut s = pending();
        s.mark_settled(Utc::now()).unwrap();
        assert_eq!(s.status(), SettlementStatus::Settled);
        assert!(s.settled_at().is_some());
    }

    #[test]
    fn test_settle_twice_fails() {
        let mut s = pending();
        s.mark_settled(Utc::now()).unwrap();
        let err = s.mark_settled(Utc::now()).unwrap_err();
        assert_eq!(err, SettlementError::InvalidState(SettlementStatus::Settled));
    }

    #[test]
    fn test_fail_then_cancel() {
        let mut s = pending();
        s.mark_failed("insufficient fund liquidity", Utc::now()).unwrap();
        assert_eq!(s.status(), SettlementStatus::Failed);
        assert_eq!(s.failure_reason(), Some("insufficient fund liquidity"));

        s.cancel(Utc::now()).unwrap();
        assert_eq!(s.status(), SettlementStatus::Cancelled);
    }

    #[test]
    fn test_settled_cannot_fail_or_cancel() {
        let mut s = pending();
        s.mark_settled(Utc::now()).unwrap();

        assert_eq!(
            s.mark_failed("late", Utc::now()).unwrap_err(),
            SettlementError::AlreadySettled
        );
        assert_eq!(s.cancel(Utc::now()).unwrap_err(), SettlementError::AlreadySettled);
        assert_eq!(s.status(), SettlementStatus::Settled);
    }

    #[test]
    fn test_settle_after_fail_is_invalid() {
        let mut s = pending();
        s.mark_failed("provider outage", Utc::now()).unwrap();
        let err = s.mark_settled(Utc::now()).unwrap_err();
        assert_eq!(err, SettlementError::InvalidState(SettlementStatus::Failed));
    }

    #[test]
    fn test_version_token_advances() {
        let v = Version::default();
        assert_ne!(v, v.next());
        assert_eq!(v.next().next(), v.next().next());
    }
}
