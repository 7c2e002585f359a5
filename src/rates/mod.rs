//! Exchange rates: the dated rate record with its validity window, the
//! currency converter, and the external FX-provider seam.

pub mod converter;
pub mod provider;
pub mod rate;
