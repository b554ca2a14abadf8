//! Browser session abstraction.
//!
//! The pipelines are written against `PortalDriver`, an owned session handle
//! exposing the handful of operations the loops need: navigate, wait for an
//! element, interact with controls, and read back the page HTML. The engine
//! behind it (Chromium in production, a scripted driver in tests) is out of
//! scope for the core logic; all extraction happens on the returned HTML.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::ScrapeResult;

/// Configuration for the browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Browser window size, width × height.
    pub window_size: (u32, u32),
    /// Timeout for a full page load on `navigate`.
    pub page_load_timeout_ms: u64,
    /// Total time `wait_for` polls before reporting the element absent.
    pub element_wait_timeout_ms: u64,
    /// Explicit Chromium binary; discovered automatically when `None`.
    pub chrome_path: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1024, 768),
            page_load_timeout_ms: 30_000,
            element_wait_timeout_ms: 10_000,
            chrome_path: None,
        }
    }
}

/// An owned, scoped browser session.
///
/// Acquired at run start and closed at run end or on error by the caller that
/// owns it. Methods take `&mut self`: one session, one page, sequential use.
#[async_trait]
pub trait PortalDriver: Send {
    /// Load a URL, blocking until the page reports loaded or the page-load
    /// timeout elapses.
    async fn navigate(&mut self, url: &str) -> ScrapeResult<()>;

    /// Poll for an element until it appears or the element-wait timeout
    /// elapses. Returns whether it was found; absence is not an error here,
    /// callers decide whether it is fatal.
    async fn wait_for(&mut self, selector: &str) -> ScrapeResult<bool>;

    /// Click the first element matching the selector.
    async fn click(&mut self, selector: &str) -> ScrapeResult<()>;

    /// Type text into the first element matching the selector.
    async fn type_text(&mut self, selector: &str, text: &str) -> ScrapeResult<()>;

    /// Send a single key (e.g. "ArrowDown", "Enter") to the element.
    async fn press_key(&mut self, selector: &str, key: &str) -> ScrapeResult<()>;

    /// Full HTML of the current page.
    async fn page_html(&mut self) -> ScrapeResult<String>;

    /// URL the session is currently on.
    async fn current_url(&mut self) -> ScrapeResult<String>;

    /// Release the session. Idempotent; errors are reported but the handle
    /// must be considered gone either way.
    async fn close(&mut self) -> ScrapeResult<()>;
}
