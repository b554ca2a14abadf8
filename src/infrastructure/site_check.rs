//! Pre-run reachability probe for the portal endpoint.
//!
//! A plain HTTP round-trip before any browser is launched: cheap to run,
//! and it turns "the portal is down" into a fatal error up front instead of
//! a browser timeout three layers deep.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::domain::{ScrapeError, ScrapeResult};

/// Result of probing the portal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStatus {
    pub is_accessible: bool,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub checked_at: DateTime<Utc>,
}

/// HTTP probe with the session's user agent and timeout.
pub struct SiteChecker {
    client: reqwest::Client,
}

impl SiteChecker {
    pub fn new(user_agent: &str, timeout_ms: u64) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| ScrapeError::Session(format!("invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::Session(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Probe the URL. Network-level failure or a non-success status is a
    /// fatal `Navigation` error; callers run this before spending a browser.
    pub async fn check(&self, url: &str) -> ScrapeResult<SiteStatus> {
        debug!("Probing portal endpoint: {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::navigation(url, format!("probe failed: {e}")))?;

        let status = SiteStatus {
            is_accessible: response.status().is_success(),
            status_code: response.status().as_u16(),
            response_time_ms: start.elapsed().as_millis() as u64,
            checked_at: Utc::now(),
        };

        if !status.is_accessible {
            return Err(ScrapeError::navigation(
                url,
                format!("probe returned HTTP {}", status.status_code),
            ));
        }

        info!(
            "Portal reachable ({} in {}ms)",
            status.status_code, status.response_time_ms
        );
        Ok(status)
    }
}
