use crate::core::currency::CurrencyCode;
use crate::core::money::{Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The kinds of receivable instruments the fund acquires.
///
/// Closed enumeration: each variant has exactly one registered pricing
/// strategy carrying its risk spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceivableType {
    /// Trade draft (duplicata) — lower-risk commercial instrument.
    TradeDraft,
    /// Post-dated check — higher-risk instrument.
    PostdatedCheck,
}

impl fmt::Display for ReceivableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceivableType::TradeDraft => write!(f, "TradeDraft"),
            ReceivableType::PostdatedCheck => write!(f, "PostdatedCheck"),
        }
    }
}

/// Errors arising from pricing computations.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("term must be at least 1 month, got {0}; ensure the due date is in the future")]
    InvalidTerm(i32),
    #[error("base rate cannot be negative, got {0}")]
    InvalidBaseRate(Decimal),
    #[error("no pricing strategy registered for receivable type '{0}'")]
    StrategyNotFound(ReceivableType),
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Immutable record of one pricing computation.
///
/// The discount is always derived (`face_value - present_value`) at
/// construction; callers cannot assemble an inconsistent result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    face_value: Money,
    present_value: Money,
    discount: Money,
    applied_spread: Decimal,
    base_rate: Decimal,
    term_in_months: i32,
    net_disbursement: Money,
    exchange_rate_applied: Decimal,
}

impl PricingResult {
    pub fn new(
        face_value: Money,
        present_value: Money,
        applied_spread: Decimal,
        base_rate: Decimal,
        term_in_months: i32,
        net_disbursement: Money,
        exchange_rate_applied: Decimal,
    ) -> Result<Self, PricingError> {
        let discount = face_value.subtract(&present_value)?;
        Ok(Self {
            face_value,
            present_value,
            discount,
            applied_spread,
            base_rate,
            term_in_months,
            net_disbursement,
            exchange_rate_applied,
        })
    }

    /// Replace the net disbursement with a cross-currency conversion of the
    /// present value, recording the rate that was applied.
    pub fn with_conversion(
        &self,
        net_disbursement: Money,
        exchange_rate_applied: Decimal,
    ) -> Self {
        Self {
            net_disbursement,
            exchange_rate_applied,
            ..self.clone()
        }
    }

    pub fn face_value(&self) -> &Money {
        &self.face_value
    }

    pub fn present_value(&self) -> &Money {
        &self.present_value
    }

    /// Discount amount (deságio) = face value − present value.
    pub fn discount(&self) -> &Money {
        &self.discount
    }

    pub fn applied_spread(&self) -> Decimal {
        self.applied_spread
    }

    pub fn base_rate(&self) -> Decimal {
        self.base_rate
    }

    pub fn term_in_months(&self) -> i32 {
        self.term_in_months
    }

    /// Amount actually paid to the cedent, in the payment currency.
    pub fn net_disbursement(&self) -> &Money {
        &self.net_disbursement
    }

    pub fn exchange_rate_applied(&self) -> Decimal {
        self.exchange_rate_applied
    }

    pub fn is_cross_currency(&self) -> bool {
        self.face_value.currency() != self.net_disbursement.currency()
    }

    /// Discount as a fraction of face value.
    pub fn discount_rate(&self) -> Decimal {
        if self.face_value.amount() == Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.discount.amount() / self.face_value.amount()
    }
}

/// `(1 + rate)^term` by exact repeated decimal multiplication.
fn compound_factor(total_rate: Decimal, term_in_months: i32) -> Decimal {
    let mut factor = Decimal::ONE;
    for _ in 0..term_in_months {
        factor *= total_rate;
    }
    factor
}

/// Discounted-cash-flow pricing contract, one implementation per
/// receivable type. Implementations differ only in the monthly risk
/// spread; the formula itself is shared:
///
/// ```text
/// present_value = face_value / (1 + base_rate + spread)^term_in_months
/// ```
///
/// The `term_in_months >= 1` guard is a hard contract, not optional
/// validation: a zero exponent makes the compound factor 1 (no discount),
/// and a negative one would invert the formula and disburse more than
/// face value.
pub trait PricingStrategy: Send + Sync + fmt::Debug {
    fn supported_type(&self) -> ReceivableType;

    /// Monthly risk spread added to the base rate.
    fn monthly_spread(&self) -> Decimal;

    fn calculate(
        &self,
        face_value: &Money,
        term_in_months: i32,
        base_rate: Decimal,
    ) -> Result<PricingResult, PricingError> {
        if term_in_months <= 0 {
            return Err(PricingError::InvalidTerm(term_in_months));
        }
        if base_rate < Decimal::ZERO {
            return Err(PricingError::InvalidBaseRate(base_rate));
        }

        let total_rate = Decimal::ONE + base_rate + self.monthly_spread();
        let present_value = face_value.divide(compound_factor(total_rate, term_in_months))?;

        // Net disbursement defaults to the present value in the face
        // currency; cross-currency conversion is applied by the caller.
        PricingResult::new(
            face_value.clone(),
            present_value.clone(),
            self.monthly_spread(),
            base_rate,
            term_in_months,
            present_value,
            Decimal::ONE,
        )
    }
}

/// Pricing for trade drafts (duplicatas). Spread: 1.5% monthly.
#[derive(Debug, Default)]
pub struct TradeDraftPricing;

impl PricingStrategy for TradeDraftPricing {
    fn supported_type(&self) -> ReceivableType {
        ReceivableType::TradeDraft
    }

    fn monthly_spread(&self) -> Decimal {
        dec!(0.015)
    }
}

/// Pricing for post-dated checks. Higher risk — spread: 2.5% monthly.
#[derive(Debug, Default)]
pub struct PostdatedCheckPricing;

impl PricingStrategy for PostdatedCheckPricing {
    fn supported_type(&self) -> ReceivableType {
        ReceivableType::PostdatedCheck
    }

    fn monthly_spread(&self) -> Decimal {
        dec!(0.025)
    }
}

/// Maps a receivable type to its pricing strategy.
///
/// The table is populated at startup; resolving an unregistered type fails
/// closed with [`PricingError::StrategyNotFound`]. Unreachable with the
/// built-in registrations, but defensive against a partial registration.
pub struct StrategyResolver {
    strategies: HashMap<ReceivableType, Box<dyn PricingStrategy>>,
}

impl StrategyResolver {
    /// Empty resolver — callers register strategies explicitly.
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register(&mut self, strategy: Box<dyn PricingStrategy>) {
        self.strategies.insert(strategy.supported_type(), strategy);
    }

    pub fn resolve(
        &self,
        receivable_type: ReceivableType,
    ) -> Result<&dyn PricingStrategy, PricingError> {
        self.strategies
            .get(&receivable_type)
            .map(|s| s.as_ref())
            .ok_or(PricingError::StrategyNotFound(receivable_type))
    }
}

impl Default for StrategyResolver {
    /// Resolver with both built-in strategies registered.
    fn default() -> Self {
        let mut resolver = Self::empty();
        resolver.register(Box::new(TradeDraftPricing));
        resolver.register(Box::new(PostdatedCheckPricing));
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_RATE: Decimal = dec!(0.0089);

    fn brl(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("BRL")).unwrap()
    }

    #[test]
    fn test_trade_draft_spread() {
        assert_eq!(TradeDraftPricing.monthly_spread(), dec!(0.015));
        assert_eq!(TradeDraftPricing.supported_type(), ReceivableType::TradeDraft);
    }

    #[test]
    fn test_postdated_check_spread() {
        assert_eq!(PostdatedCheckPricing.monthly_spread(), dec!(0.025));
        assert_eq!(
            PostdatedCheckPricing.supported_type(),
            ReceivableType::PostdatedCheck
        );
    }

    #[test]
    fn test_present_value_below_face_value() {
        for term in [1, 3, 6, 12] {
            let result = TradeDraftPricing
                .calculate(&brl(dec!(10_000)), term, BASE_RATE)
                .unwrap();
            assert!(result.present_value().amount() < dec!(10_000));
            assert!(result.discount().amount() > Decimal::ZERO);
        }
    }

    #[test]
    fn test_formula_manual_verification() {
        // pv = 10_000 / 1.0239^3 = 10_000 / 1.073427281919 = 9_315.95476...
        let result = TradeDraftPricing
            .calculate(&brl(dec!(10_000)), 3, BASE_RATE)
            .unwrap();
        assert_eq!(result.present_value().settlement_amount(), dec!(9315.95));
        assert_eq!(result.discount().settlement_amount(), dec!(684.05));
    }

    #[test]
    fn test_discount_equals_face_minus_present_value() {
        let result = TradeDraftPricing
            .calculate(&brl(dec!(10_000)), 3, BASE_RATE)
            .unwrap();
        let expected = result
            .face_value()
            .subtract(result.present_value())
            .unwrap();
        assert_eq!(result.discount(), &expected);
    }

    #[test]
    fn test_higher_spread_yields_strictly_lower_present_value() {
        let face = brl(dec!(10_000));
        let draft = TradeDraftPricing.calculate(&face, 3, BASE_RATE).unwrap();
        let check = PostdatedCheckPricing.calculate(&face, 3, BASE_RATE).unwrap();

        assert!(check.present_value().amount() < draft.present_value().amount());
        assert!(check.discount().amount() > draft.discount().amount());
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = TradeDraftPricing
            .calculate(&brl(dec!(10_000)), 0, BASE_RATE)
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidTerm(0)));
    }

    #[test]
    fn test_negative_term_rejected() {
        for strategy in [
            &TradeDraftPricing as &dyn PricingStrategy,
            &PostdatedCheckPricing as &dyn PricingStrategy,
        ] {
            let err = strategy
                .calculate(&brl(dec!(10_000)), -2, BASE_RATE)
                .unwrap_err();
            assert!(matches!(err, PricingError::InvalidTerm(-2)));
        }
    }

    #[test]
    fn test_negative_base_rate_rejected() {
        let err = TradeDraftPricing
            .calculate(&brl(dec!(10_000)), 3, dec!(-0.01))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidBaseRate(_)));
    }

    #[test]
    fn test_zero_base_rate_spread_still_discounts() {
        let result = TradeDraftPricing
            .calculate(&brl(dec!(5_000)), 2, Decimal::ZERO)
            .unwrap();
        assert!(result.present_value().amount() < dec!(5_000));
        assert!(result.discount().amount() > Decimal::ZERO);
    }

    #[test]
    fn test_net_disbursement_defaults_to_present_value() {
        let result = TradeDraftPricing
            .calculate(&brl(dec!(10_000)), 3, BASE_RATE)
            .unwrap();
        assert_eq!(result.net_disbursement(), result.present_value());
        assert_eq!(result.exchange_rate_applied(), Decimal::ONE);
        assert!(!result.is_cross_currency());
    }

    #[test]
    fn test_resolver_resolves_builtins() {
        let resolver = StrategyResolver::default();
        assert_eq!(
            resolver
                .resolve(ReceivableType::TradeDraft)
                .unwrap()
                .monthly_spread(),
            dec!(0.015)
        );
        assert_eq!(
            resolver
                .resolve(ReceivableType::PostdatedCheck)
                .unwrap()
                .monthly_spread(),
            dec!(0.025)
        );
    }

    #[test]
    fn test_resolver_fails_closed_when_unregistered() {
        let resolver = StrategyResolver::empty();
        let err = resolver.resolve(ReceivableType::TradeDraft).unwrap_err();
        assert!(matches!(err, PricingError::StrategyNotFound(_)));
    }
}
