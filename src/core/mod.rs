//! Foundational domain types: currencies, money, pricing, receivables,
//! and the settlement state machine.

pub mod cedent;
pub mod currency;
pub mod money;
pub mod pricing;
pub mod receivable;
pub mod settlement;
