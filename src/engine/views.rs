use crate::core::cedent::Cedent;
use crate::core::currency::CurrencyCode;
use crate::core::pricing::PricingResult;
use crate::core::receivable::Receivable;
use crate::core::settlement::{Settlement, SettlementStatus};
use crate::rates::rate::ExchangeRate;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn percent(fraction: Decimal) -> Decimal {
    fraction * Decimal::ONE_HUNDRED
}

/// Result of a pricing simulation — settlement-precision figures only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingView {
    pub face_value: Decimal,
    pub face_currency: CurrencyCode,
    pub present_value: Decimal,
    pub discount: Decimal,
    pub discount_rate_percent: Decimal,
    pub applied_spread_percent: Decimal,
    pub base_rate_percent: Decimal,
    pub term_in_months: i32,
    pub net_disbursement: Decimal,
    pub payment_currency: CurrencyCode,
    pub exchange_rate_applied: Decimal,
    pub is_cross_currency: bool,
    pub simulated_at: DateTime<Utc>,
}

impl PricingView {
    pub fn from_result(pricing: &PricingResult, simulated_at: DateTime<Utc>) -> Self {
        Self {
            face_value: pricing.face_value().settlement_amount(),
            face_currency: pricing.face_value().currency().clone(),
            present_value: pricing.present_value().settlement_amount(),
            discount: pricing.discount().settlement_amount(),
            discount_rate_percent: percent(pricing.discount_rate()).round_dp(4),
            applied_spread_percent: percent(pricing.applied_spread()),
            base_rate_percent: percent(pricing.base_rate()),
            term_in_months: pricing.term_in_months(),
            net_disbursement: pricing.net_disbursement().settlement_amount(),
            payment_currency: pricing.net_disbursement().currency().clone(),
            exchange_rate_applied: pricing.exchange_rate_applied(),
            is_cross_currency: pricing.is_cross_currency(),
            simulated_at,
        }
    }
}

/// Fully assembled settlement view: pricing figures plus receivable and
/// cedent identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementView {
    pub id: Uuid,
    pub receivable_id: Uuid,
    pub document_number: String,
    pub cedent_name: String,
    pub cedent_tax_id: String,
    pub receivable_type: String,
    pub face_value: Decimal,
    pub face_currency: CurrencyCode,
    pub present_value: Decimal,
    pub discount: Decimal,
    pub discount_rate_percent: Decimal,
    pub applied_spread_percent: Decimal,
    pub base_rate_percent: Decimal,
    pub term_in_months: i32,
    pub net_disbursement: Decimal,
    pub payment_currency: CurrencyCode,
    pub exchange_rate_applied: Decimal,
    pub is_cross_currency: bool,
    pub status: SettlementStatus,
    pub settled_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SettlementView {
    pub fn from_parts(settlement: &Settlement, receivable: &Receivable, cedent: &Cedent) -> Self {
        let discount_rate = if settlement.face_value() > Decimal::ZERO {
            settlement.discount() / settlement.face_value()
        } else {
            Decimal::ZERO
        };
        Self {
            id: settlement.id(),
            receivable_id: receivable.id(),
            document_number: receivable.document_number().to_string(),
            cedent_name: cedent.name().to_string(),
            cedent_tax_id: cedent.tax_id().to_string(),
            receivable_type: receivable.receivable_type().to_string(),
            face_value: settlement.face_value(),
            face_currency: settlement.face_currency().clone(),
            present_value: settlement.present_value(),
            discount: settlement.discount(),
            discount_rate_percent: percent(discount_rate).round_dp(4),
            applied_spread_percent: percent(settlement.applied_spread()),
            base_rate_percent: percent(settlement.base_rate()),
            term_in_months: settlement.term_in_months(),
            net_disbursement: settlement.net_disbursement(),
            payment_currency: settlement.payment_currency().clone(),
            exchange_rate_applied: settlement.exchange_rate_applied(),
            is_cross_currency: settlement.is_cross_currency(),
            status: settlement.status(),
            settled_at: settlement.settled_at(),
            failure_reason: settlement.failure_reason().map(str::to_string),
            created_at: settlement.created_at(),
        }
    }
}

/// Exchange-rate view for rate endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateView {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
    pub effective_date: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&ExchangeRate> for RateView {
    fn from(rate: &ExchangeRate) -> Self {
        Self {
            from: rate.from().clone(),
            to: rate.to().clone(),
            rate: rate.rate(),
            effective_date: rate.effective_date(),
            expires_at: rate.expires_at(),
            source: rate.source().to_string(),
            updated_at: rate.updated_at(),
        }
    }
}

/// Filter and pagination for the settlement statement listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementFilter {
    pub cedent_id: Option<Uuid>,
    pub status: Option<SettlementStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for StatementFilter {
    fn default() -> Self {
        Self {
            cedent_id: None,
            status: None,
            from: None,
            to: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// One page of the settlement statement, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementPage {
    pub items: Vec<SettlementView>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
