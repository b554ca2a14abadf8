//! Runtime configuration for a scraping session.
//!
//! Supplied at construction time by the caller; there is no config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::driver::DriverConfig;

/// Knobs shared by the collector and enricher loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Courtesy pause between page loads (collector) and between records
    /// (enricher). A fixed delay, not adaptive backoff.
    pub request_delay_ms: u64,

    /// Defensive upper bound on pagination; the portal's own "last page"
    /// signal is the normal termination condition.
    pub max_pages: u32,

    /// Collector checkpoint cadence: rewrite the output file every N pages.
    pub checkpoint_every_pages: u32,

    /// Enricher checkpoint cadence: rewrite the output file every N records.
    pub checkpoint_every_records: usize,

    /// User agent for the HTTP probe.
    pub user_agent: String,

    /// Browser session settings.
    pub driver: DriverConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1_000,
            max_pages: 500,
            checkpoint_every_pages: 1,
            checkpoint_every_records: 50,
            user_agent: "school-scout/0.2 (Educational Purpose)".to_string(),
            driver: DriverConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = CrawlConfig::default();
        assert!(config.request_delay_ms >= 500, "courtesy delay too small");
        assert!(config.max_pages > 0);
        assert!(config.checkpoint_every_pages > 0);
        assert!(config.checkpoint_every_records > 0);
    }
}
