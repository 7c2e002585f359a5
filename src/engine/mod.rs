//! Orchestration layer: the settlement engine, its error taxonomy, and the
//! read models it returns.

pub mod error;
pub mod orchestrator;
pub mod views;
