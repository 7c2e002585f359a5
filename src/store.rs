//! In-memory persistence collaborator.
//!
//! Real storage (a relational database) is an external collaborator; this
//! module ships the contract the engine relies on — uniqueness constraints,
//! versioned updates, point-in-time rate selection, and an all-or-nothing
//! transaction scope — backed by process memory so every guarantee is
//! exercised by the test suite.

use crate::core::cedent::Cedent;
use crate::core::currency::CurrencyCode;
use crate::core::receivable::Receivable;
use crate::core::settlement::Settlement;
use crate::rates::rate::{ExchangeRate, RateError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use uuid::Uuid;

/// Constraint and concurrency failures surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on (cedent, document) or on
    /// settlement-per-receivable — the storage-level second line of
    /// defense behind the orchestrator's proactive idempotency check.
    #[error("document '{document}' has already been settled")]
    DuplicateSettlement { document: String },
    /// Version-token mismatch on an update; the caller should reload and
    /// retry.
    #[error("concurrent update detected on {entity}")]
    ConcurrencyConflict { entity: &'static str },
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Mutable store contents. Handed to transaction closures; nested
/// operations work against the same staged state and thereby join the
/// open scope.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    cedents: HashMap<Uuid, Cedent>,
    receivables: HashMap<Uuid, Receivable>,
    settlements: HashMap<Uuid, Settlement>,
    rates: Vec<ExchangeRate>,
}

impl StoreState {
    // --- Cedents ---

    pub fn insert_cedent(&mut self, cedent: Cedent) {
        self.cedents.insert(cedent.id(), cedent);
    }

    pub fn cedent(&self, id: Uuid) -> Option<&Cedent> {
        self.cedents.get(&id)
    }

    // --- Receivables ---

    /// Insert a receivable, enforcing uniqueness on
    /// (cedent, document number).
    pub fn insert_receivable(&mut self, receivable: Receivable) -> Result<(), StoreError> {
        if self
            .receivable_by_document(receivable.cedent_id(), receivable.document_number())
            .is_some()
        {
            return Err(StoreError::DuplicateSettlement {
                document: receivable.document_number().to_string(),
            });
        }
        self.receivables.insert(receivable.id(), receivable);
        Ok(())
    }

    pub fn receivable(&self, id: Uuid) -> Option<&Receivable> {
        self.receivables.get(&id)
    }

    pub fn receivable_by_document(&self, cedent_id: Uuid, document: &str) -> Option<&Receivable> {
        self.receivables
            .values()
            .find(|r| r.cedent_id() == cedent_id && r.document_number() == document)
    }

    // --- Settlements ---

    /// Insert a settlement, enforcing the 1:1 settlement-per-receivable
    /// constraint.
    pub fn insert_settlement(&mut self, settlement: Settlement) -> Result<(), StoreError> {
        if self
            .settlement_by_receivable(settlement.receivable_id())
            .is_some()
        {
            let document = self
                .receivable(settlement.receivable_id())
                .map(|r| r.document_number().to_string())
                .unwrap_or_default();
            return Err(StoreError::DuplicateSettlement { document });
        }
        self.settlements.insert(settlement.id(), settlement);
        Ok(())
    }

    pub fn settlement(&self, id: Uuid) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    pub fn settlement_by_receivable(&self, receivable_id: Uuid) -> Option<&Settlement> {
        self.settlements
            .values()
            .find(|s| s.receivable_id() == receivable_id)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    /// Compare-and-swap update: the presented record must carry the stored
    /// version token. On success the stored token is bumped and the new
    /// record returned.
    pub fn update_settlement(&mut self, updated: Settlement) -> Result<Settlement, StoreError> {
        let current = self.settlements.get(&updated.id()).ok_or({
            StoreError::ConcurrencyConflict {
                entity: "settlement",
            }
        })?;
        if current.version() != updated.version() {
            return Err(StoreError::ConcurrencyConflict {
                entity: "settlement",
            });
        }
        let mut updated = updated;
        updated.bump_version();
        self.settlements.insert(updated.id(), updated.clone());
        Ok(updated)
    }

    // --- Exchange rates ---

    /// The most recent rate whose validity window covers `at`, for the
    /// exact ordered pair. No reverse-pair inference.
    pub fn latest_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        at: DateTime<Utc>,
    ) -> Option<&ExchangeRate> {
        self.rates
            .iter()
            .filter(|r| r.from() == from && r.to() == to && r.is_valid_at(at))
            .max_by_key(|r| r.effective_date())
    }

    /// Rates for the pair with effective date within `[from_date, to_date]`,
    /// newest first.
    pub fn rate_history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
    ) -> Vec<ExchangeRate> {
        let mut history: Vec<ExchangeRate> = self
            .rates
            .iter()
            .filter(|r| {
                r.from() == from
                    && r.to() == to
                    && r.effective_date() >= from_date
                    && r.effective_date() <= to_date
            })
            .cloned()
            .collect();
        history.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));
        history
    }

    /// Update the newest record for the pair in place (new rate/source,
    /// effective date reset to `now`) or insert a fresh one.
    pub fn upsert_rate(
        &mut self,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<ExchangeRate, StoreError> {
        let newest = self
            .rates
            .iter_mut()
            .filter(|r| r.from() == &from && r.to() == &to)
            .max_by_key(|r| r.effective_date());

        match newest {
            Some(existing) => {
                existing.update(rate, source, now)?;
                existing.bump_version();
                Ok(existing.clone())
            }
            None => {
                let record = ExchangeRate::new(from, to, rate, now, source, None)?;
                self.rates.push(record.clone());
                Ok(record)
            }
        }
    }

    /// Compare-and-swap update of a rate record by id + version token.
    pub fn update_rate(&mut self, updated: ExchangeRate) -> Result<ExchangeRate, StoreError> {
        let current = self
            .rates
            .iter_mut()
            .find(|r| r.id() == updated.id())
            .ok_or(StoreError::ConcurrencyConflict {
                entity: "exchange rate",
            })?;
        if current.version() != updated.version() {
            return Err(StoreError::ConcurrencyConflict {
                entity: "exchange rate",
            });
        }
        let mut updated = updated;
        updated.bump_version();
        *current = updated.clone();
        Ok(updated)
    }
}

/// Thread-safe store with an all-or-nothing transaction scope.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a staged copy of the store. The staged state is
    /// swapped in only when `f` succeeds; on error nothing becomes
    /// visible. Constraint checks inside `f` run against the staged state
    /// under the store lock, so a violation here is the commit-time
    /// equivalent of a database unique constraint firing.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        *guard = staged;
        Ok(value)
    }

    /// Read-only access outside any transaction.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}
