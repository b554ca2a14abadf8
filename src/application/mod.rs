//! The two pipeline phases, written once against `PortalProfile`.

pub mod collector;
pub mod enricher;

pub use collector::Collector;
pub use enricher::{Enricher, EnrichmentSummary};
