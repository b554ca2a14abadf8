//! Domain model: records, filters, and the error taxonomy.

pub mod error;
pub mod record;

pub use error::{ScrapeError, ScrapeResult};
pub use record::{FilterSet, RecordStore, SchoolRecord};
