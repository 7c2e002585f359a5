use crate::core::cedent::CedentError;
use crate::core::money::MoneyError;
use crate::core::pricing::PricingError;
use crate::core::receivable::ReceivableError;
use crate::core::settlement::SettlementError;
use crate::rates::rate::RateError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Business-level failures surfaced to callers.
///
/// Every variant maps to a stable machine-readable code via
/// [`EngineError::code`]; none are swallowed or retried inside the core.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error(transparent)]
    Receivable(#[from] ReceivableError),
    #[error(transparent)]
    Cedent(#[from] CedentError),
    #[error("document '{document}' has already been settled")]
    DuplicateSettlement { document: String },
    #[error("cedent {0} not found")]
    CedentNotFound(Uuid),
    #[error("settlement {0} not found")]
    SettlementNotFound(Uuid),
    #[error("receivable {0} not found")]
    ReceivableNotFound(Uuid),
    #[error("concurrent update detected on {entity}; reload and retry")]
    ConcurrencyConflict { entity: &'static str },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSettlement { document } => {
                EngineError::DuplicateSettlement { document }
            }
            StoreError::ConcurrencyConflict { entity } => {
                EngineError::ConcurrencyConflict { entity }
            }
            StoreError::Rate(e) => EngineError::Rate(e),
        }
    }
}

impl EngineError {
    /// Stable code for transport layers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Money(MoneyError::InvalidAmount(_)) => "INVALID_AMOUNT",
            EngineError::Money(MoneyError::CurrencyMismatch { .. }) => "CURRENCY_MISMATCH",
            EngineError::Money(MoneyError::DivisionByZero) => "DIVISION_BY_ZERO",
            EngineError::Money(MoneyError::InvalidRate(_)) => "INVALID_PRICING",
            EngineError::Pricing(PricingError::StrategyNotFound(_)) => "STRATEGY_NOT_FOUND",
            EngineError::Pricing(PricingError::Money(e)) => {
                match e {
                    MoneyError::InvalidAmount(_) => "INVALID_AMOUNT",
                    MoneyError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
                    MoneyError::DivisionByZero => "DIVISION_BY_ZERO",
                    MoneyError::InvalidRate(_) => "INVALID_PRICING",
                }
            }
            EngineError::Pricing(_) => "INVALID_PRICING",
            EngineError::Settlement(SettlementError::InvalidState(_)) => "SETTLEMENT_INVALID_STATE",
            EngineError::Settlement(SettlementError::AlreadySettled) => {
                "SETTLEMENT_ALREADY_SETTLED"
            }
            EngineError::Rate(RateError::NotFound { .. }) => "EXCHANGE_RATE_NOT_FOUND",
            EngineError::Rate(RateError::InvalidRate { .. }) => "INVALID_PRICING",
            EngineError::Receivable(ReceivableError::BlankDocumentNumber) => "INVALID_DOC",
            EngineError::Receivable(_) => "INVALID_PRICING",
            EngineError::Cedent(_) => "INVALID_CEDENT",
            EngineError::DuplicateSettlement { .. } => "DUPLICATE_SETTLEMENT",
            EngineError::CedentNotFound(_) => "CEDENT_NOT_FOUND",
            EngineError::SettlementNotFound(_) => "SETTLEMENT_NOT_FOUND",
            EngineError::ReceivableNotFound(_) => "RECEIVABLE_NOT_FOUND",
            EngineError::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_codes_are_stable() {
        let err = EngineError::Money(MoneyError::InvalidAmount(dec!(-1)));
        assert_eq!(err.code(), "INVALID_AMOUNT");

        let err = EngineError::Rate(RateError::NotFound {
            from: CurrencyCode::new("USD"),
            to: CurrencyCode::new("BRL"),
        });
        assert_eq!(err.code(), "EXCHANGE_RATE_NOT_FOUND");

        let err = EngineError::DuplicateSettlement {
            document: "DOC-1".into(),
        };
        assert_eq!(err.code(), "DUPLICATE_SETTLEMENT");
    }

    #[test]
    fn test_store_constraint_maps_to_duplicate_settlement() {
        let err: EngineError = StoreError::DuplicateSettlement {
            document: "DOC-1".into(),
        }
        .into();
        assert_eq!(err.code(), "DUPLICATE_SETTLEMENT");
    }

    #[test]
    fn test_store_cas_maps_to_concurrency_conflict() {
        let err: EngineError = StoreError::ConcurrencyConflict {
            entity: "settlement",
        }
        .into();
        assert_eq!(err.code(), "CONCURRENCY_CONFLICT");
    }
}
