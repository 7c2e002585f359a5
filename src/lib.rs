//! # credit-engine
//!
//! Receivables pricing and settlement engine for a credit-rights fund.
//!
//! Cedents submit trade drafts and post-dated checks; the engine prices
//! them by discounted cash flow, converts the net disbursement across
//! currencies when needed, and settles them atomically with idempotency
//! and optimistic-concurrency guarantees.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: money, currencies, pricing strategies,
//!   receivables, cedents, the settlement state machine
//! - **rates** — Exchange-rate records, currency conversion, external FX
//!   providers
//! - **store** — Transactional in-memory persistence with uniqueness and
//!   versioned-update guarantees
//! - **engine** — The settlement orchestrator, error taxonomy, and read
//!   models

pub mod core;
pub mod engine;
pub mod rates;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::cedent::Cedent;
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::money::Money;
    pub use crate::core::pricing::{PricingStrategy, ReceivableType, StrategyResolver};
    pub use crate::core::receivable::Receivable;
    pub use crate::core::settlement::{Settlement, SettlementStatus};
    pub use crate::engine::error::EngineError;
    pub use crate::engine::orchestrator::{
        SettlementEngine, SettlementRequest, SimulationRequest,
    };
    pub use crate::rates::provider::{FxRateProvider, StaticRateProvider};
}
