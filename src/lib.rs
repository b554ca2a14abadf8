//! School Scout: two-phase scraper for state school directories.
//!
//! Phase one (the collector) drives a browser through a portal's paginated
//! school listing, applies grade-level filters, and persists one record per
//! row to a CSV store. Phase two (the enricher) revisits each record's
//! detail page and merges in phone and website, checkpointing as it goes.
//!
//! State portals plug in through [`portal::PortalProfile`]; Texas
//! ([`portal::TexasPortal`]) is the shipped implementation.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod portal;

pub use application::{Collector, Enricher, EnrichmentSummary};
pub use domain::{FilterSet, RecordStore, SchoolRecord, ScrapeError, ScrapeResult};
pub use infrastructure::{ChromiumDriver, CrawlConfig, CsvStore, DriverConfig, PortalDriver};
pub use portal::{PortalProfile, TexasPortal};
