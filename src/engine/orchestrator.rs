use crate::core::cedent::Cedent;
use crate::core::currency::CurrencyCode;
use crate::core::money::Money;
use crate::core::pricing::{PricingResult, ReceivableType, StrategyResolver};
use crate::core::receivable::{term_in_months, Receivable};
use crate::core::settlement::{Settlement, SettlementError, SettlementStatus};
use crate::engine::error::EngineError;
use crate::engine::views::{PricingView, RateView, SettlementView, StatementFilter, StatementPage};
use crate::rates::converter::CurrencyConverter;
use crate::rates::provider::{FxRateProvider, UnavailableProvider};
use crate::rates::rate::RateError;
use crate::store::{MemoryStore, StoreState};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference monthly base rate used when none is configured
/// (CDI-like proxy, ~0.89% per month).
pub const DEFAULT_BASE_RATE_MONTHLY: Decimal = dec!(0.0089);

/// Inputs for a pricing simulation. Pure computation — nothing persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub face_value: Decimal,
    pub face_currency: CurrencyCode,
    pub payment_currency: CurrencyCode,
    pub receivable_type: ReceivableType,
    pub due_date: DateTime<Utc>,
}

/// Inputs for the atomic create-and-settle operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub cedent_id: Uuid,
    pub document_number: String,
    pub receivable_type: ReceivableType,
    pub face_value: Decimal,
    pub face_currency: CurrencyCode,
    pub payment_currency: CurrencyCode,
    pub due_date: DateTime<Utc>,
}

/// Coordinates receivable creation, pricing, currency conversion, and
/// settlement persistence as one atomic, idempotent operation.
///
/// Concurrency is imposed externally (request-per-call); the engine itself
/// owns no scheduler. All multi-step persistence runs inside a single
/// store transaction: either every effect is durably visible or none are.
pub struct SettlementEngine<P: FxRateProvider = UnavailableProvider> {
    store: MemoryStore,
    resolver: StrategyResolver,
    converter: CurrencyConverter,
    provider: P,
    base_rate: Decimal,
}

impl SettlementEngine<UnavailableProvider> {
    /// Engine with the built-in strategies, the default base rate, and no
    /// external FX source.
    pub fn new() -> Self {
        Self::with_provider(UnavailableProvider)
    }
}

impl Default for SettlementEngine<UnavailableProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FxRateProvider> SettlementEngine<P> {
    pub fn with_provider(provider: P) -> Self {
        Self {
            store: MemoryStore::new(),
            resolver: StrategyResolver::default(),
            converter: CurrencyConverter,
            provider,
            base_rate: DEFAULT_BASE_RATE_MONTHLY,
        }
    }

    pub fn with_base_rate(mut self, base_rate: Decimal) -> Self {
        self.base_rate = base_rate;
        self
    }

    pub fn base_rate(&self) -> Decimal {
        self.base_rate
    }

    /// The underlying store. Exposed for wiring and test setup.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    // --- Cedents ---

    pub fn register_cedent(
        &self,
        name: impl Into<String>,
        tax_id: impl Into<String>,
    ) -> Result<Cedent, EngineError> {
        let cedent = Cedent::new(name, tax_id, Utc::now())?;
        self.store.transaction(|state| -> Result<(), EngineError> {
            state.insert_cedent(cedent.clone());
            Ok(())
        })?;
        Ok(cedent)
    }

    // --- Pricing ---

    /// Price a hypothetical receivable. Reads rates but writes nothing.
    pub fn simulate(&self, request: &SimulationRequest) -> Result<PricingView, EngineError> {
        let now = Utc::now();
        let term = term_in_months(now, request.due_date);
        let face = Money::new(request.face_value, request.face_currency.clone())?;
        let strategy = self.resolver.resolve(request.receivable_type)?;
        let result = strategy.calculate(&face, term, self.base_rate)?;
        let result = self.store.read(|state| {
            self.apply_conversion(state, result, &request.payment_currency, now)
        })?;
        Ok(PricingView::from_result(&result, now))
    }

    /// The atomic settlement operation:
    ///
    /// 1. idempotency check — an already-settled (cedent, document) pair
    ///    is a conflict;
    /// 2. receivable validation and pricing in the face currency;
    /// 3. cross-currency conversion of the net disbursement when the
    ///    payment currency differs;
    /// 4. one transaction: insert receivable, insert Pending settlement,
    ///    transition to Settled.
    ///
    /// The storage uniqueness constraints re-check step 1 at commit, so a
    /// concurrent identical request that slipped past the proactive check
    /// still surfaces as `DuplicateSettlement`.
    pub fn create_and_settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementView, EngineError> {
        let now = Utc::now();

        let cedent = self
            .store
            .read(|state| state.cedent(request.cedent_id).cloned())
            .ok_or(EngineError::CedentNotFound(request.cedent_id))?;

        let already_settled = self.store.read(|state| {
            state
                .receivable_by_document(request.cedent_id, &request.document_number)
                .and_then(|r| state.settlement_by_receivable(r.id()))
                .is_some()
        });
        if already_settled {
            return Err(EngineError::DuplicateSettlement {
                document: request.document_number.clone(),
            });
        }

        let receivable = Receivable::new(
            request.cedent_id,
            request.document_number.clone(),
            request.receivable_type,
            request.face_value,
            request.face_currency.clone(),
            request.due_date,
            now,
        )?;
        let term = receivable.term_in_months(now);

        let face = Money::new(request.face_value, request.face_currency.clone())?;
        let strategy = self.resolver.resolve(request.receivable_type)?;
        let base_pricing = strategy.calculate(&face, term, self.base_rate)?;
        let pricing = self.store.read(|state| {
            self.apply_conversion(state, base_pricing, &request.payment_currency, now)
        })?;

        let settlement = self
            .store
            .transaction(|state| -> Result<Settlement, EngineError> {
                state.insert_receivable(receivable.clone())?;
                let pending = Settlement::pending(receivable.id(), &pricing, now);
                state.insert_settlement(pending.clone())?;

                // The fund acquires the receivable immediately.
                let mut settled = pending;
                settled.mark_settled(now)?;
                Ok(state.update_settlement(settled)?)
            })?;

        info!(
            "settled document '{}' for cedent {}: net disbursement {} {}",
            receivable.document_number(),
            cedent.id(),
            settlement.net_disbursement(),
            settlement.payment_currency(),
        );
        Ok(SettlementView::from_parts(&settlement, &receivable, &cedent))
    }

    /// Convert the net disbursement into the payment currency using the
    /// latest valid stored rate. Same-currency requests pass through with
    /// an applied rate of 1.
    fn apply_conversion(
        &self,
        state: &StoreState,
        pricing: PricingResult,
        payment_currency: &CurrencyCode,
        now: DateTime<Utc>,
    ) -> Result<PricingResult, EngineError> {
        if pricing.face_value().currency() == payment_currency {
            return Ok(pricing);
        }
        let rate = state
            .latest_rate(pricing.face_value().currency(), payment_currency, now)
            .ok_or_else(|| {
                EngineError::Rate(RateError::NotFound {
                    from: pricing.face_value().currency().clone(),
                    to: payment_currency.clone(),
                })
            })?;
        let converted = self.converter.convert(
            pricing.present_value(),
            payment_currency.clone(),
            rate.rate(),
        )?;
        Ok(pricing.with_conversion(converted, rate.rate()))
    }

    // --- Settlement reads & transitions ---

    pub fn settlement(&self, id: Uuid) -> Result<SettlementView, EngineError> {
        self.store.read(|state| {
            let settlement = state
                .settlement(id)
                .ok_or(EngineError::SettlementNotFound(id))?;
            self.assemble_view(state, settlement)
        })
    }

    /// Filtered, paginated settlement listing, newest first.
    pub fn statement(&self, filter: &StatementFilter) -> Result<StatementPage, EngineError> {
        self.store.read(|state| {
            let mut matching: Vec<&Settlement> = state
                .settlements()
                .filter(|s| {
                    filter.status.map_or(true, |wanted| s.status() == wanted)
                        && filter.from.map_or(true, |from| s.created_at() >= from)
                        && filter.to.map_or(true, |to| s.created_at() <= to)
                        && filter.cedent_id.map_or(true, |cedent_id| {
                            state
                                .receivable(s.receivable_id())
                                .map_or(false, |r| r.cedent_id() == cedent_id)
                        })
                })
                .collect();
            matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

            let total = matching.len();
            let page = filter.page.max(1);
            let page_size = filter.page_size.max(1);
            let items = matching
                .into_iter()
                .skip((page - 1) * page_size)
                .take(page_size)
                .map(|s| self.assemble_view(state, s))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(StatementPage {
                items,
                total,
                page,
                page_size,
            })
        })
    }

    /// Transition a settlement to Failed, recording the reason.
    pub fn fail_settlement(
        &self,
        id: Uuid,
        reason: impl Into<String>,
    ) -> Result<SettlementView, EngineError> {
        let reason = reason.into();
        let now = Utc::now();
        self.store
            .transaction(|state| -> Result<SettlementView, EngineError> {
                let mut settlement = state
                    .settlement(id)
                    .cloned()
                    .ok_or(EngineError::SettlementNotFound(id))?;
                settlement.mark_failed(reason.clone(), now)?;
                let committed = state.update_settlement(settlement)?;
                self.assemble_view(state, &committed)
            })
    }

    /// Cancel a Failed settlement. Only the Failed → Cancelled transition
    /// is reachable through the engine; cancelling a Pending settlement is
    /// an invalid state, cancelling a Settled one is already-settled.
    pub fn cancel_settlement(&self, id: Uuid) -> Result<SettlementView, EngineError> {
        let now = Utc::now();
        self.store
            .transaction(|state| -> Result<SettlementView, EngineError> {
                let mut settlement = state
                    .settlement(id)
                    .cloned()
                    .ok_or(EngineError::SettlementNotFound(id))?;
                match settlement.status() {
                    SettlementStatus::Failed => {}
                    SettlementStatus::Settled => {
                        return Err(SettlementError::AlreadySettled.into());
                    }
                    other => {
                        return Err(SettlementError::InvalidState(other).into());
                    }
                }
                settlement.cancel(now)?;
                let committed = state.update_settlement(settlement)?;
                self.assemble_view(state, &committed)
            })
    }

    fn assemble_view(
        &self,
        state: &StoreState,
        settlement: &Settlement,
    ) -> Result<SettlementView, EngineError> {
        let receivable = state
            .receivable(settlement.receivable_id())
            .ok_or(EngineError::ReceivableNotFound(settlement.receivable_id()))?;
        let cedent = state
            .cedent(receivable.cedent_id())
            .ok_or(EngineError::CedentNotFound(receivable.cedent_id()))?;
        Ok(SettlementView::from_parts(settlement, receivable, cedent))
    }

    // --- Exchange rates ---

    /// Manually upsert a rate: updates the pair's newest record in place
    /// or inserts a fresh one.
    pub fn upsert_rate(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
        source: &str,
    ) -> Result<RateView, EngineError> {
        let now = Utc::now();
        let record = self
            .store
            .transaction(|state| state.upsert_rate(from, to, rate, source, now))
            .map_err(EngineError::from)?;
        Ok(RateView::from(&record))
    }

    pub fn latest_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<RateView, EngineError> {
        let now = Utc::now();
        self.store.read(|state| {
            state
                .latest_rate(from, to, now)
                .map(RateView::from)
                .ok_or_else(|| {
                    EngineError::Rate(RateError::NotFound {
                        from: from.clone(),
                        to: to.clone(),
                    })
                })
        })
    }

    pub fn rate_history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
    ) -> Vec<RateView> {
        self.store.read(|state| {
            state
                .rate_history(from, to, from_date, to_date)
                .iter()
                .map(RateView::from)
                .collect()
        })
    }

    /// Pull a quote from the external provider and store it. Provider
    /// unavailability (including timeout, handled inside the provider)
    /// degrades to `ExchangeRateNotFound` for this refresh only — stored
    /// manual rates are untouched and keep serving conversions.
    pub fn refresh_rate_from_provider(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<RateView, EngineError> {
        match self.provider.fetch(from, to) {
            Some(quote) => {
                info!(
                    "fetched {} -> {} = {} from '{}'",
                    quote.from, quote.to, quote.rate, quote.source
                );
                self.upsert_rate(quote.from, quote.to, quote.rate, &quote.source)
            }
            None => {
                warn!(
                    "FX provider unavailable for {} -> {}; manual rates remain in effect",
                    from, to
                );
                Err(EngineError::Rate(RateError::NotFound {
                    from: from.clone(),
                    to: to.clone(),
                }))
            }
        }
    }
}
