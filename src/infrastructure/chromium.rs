//! Chromium-backed portal driver using chromiumoxide.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::driver::{DriverConfig, PortalDriver};
use crate::domain::{ScrapeError, ScrapeResult};

/// How often `wait_for` re-checks for the element.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SCHOOL_SCOUT_CHROMIUM env
    if let Ok(p) = std::env::var("SCHOOL_SCOUT_CHROMIUM") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.school-scout/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".school-scout/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".school-scout/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".school-scout/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".school-scout/chromium/chrome-linux64/chrome"),
                home.join(".school-scout/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// A single-page Chromium session.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    config: DriverConfig,
    closed: bool,
}

impl ChromiumDriver {
    /// Launch a Chromium instance and open one blank page.
    pub async fn launch(config: DriverConfig) -> ScrapeResult<Self> {
        let chrome_path = match &config.chrome_path {
            Some(p) => p.clone(),
            None => find_chromium().ok_or_else(|| {
                ScrapeError::Session(
                    "Chromium not found; set SCHOOL_SCOUT_CHROMIUM or install google-chrome"
                        .to_string(),
                )
            })?,
        };
        debug!("Launching Chromium from {}", chrome_path.display());

        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg(format!("--window-size={width},{height}"))
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if config.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| ScrapeError::Session(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::Session(format!("failed to launch Chromium: {e}")))?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Session(format!("failed to open page: {e}")))?;

        Ok(Self {
            browser,
            page,
            handler_task,
            config,
            closed: false,
        })
    }
}

#[async_trait]
impl PortalDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> ScrapeResult<()> {
        let timeout = Duration::from_millis(self.config.page_load_timeout_ms);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                // Settle SPA navigations before handing HTML to extractors.
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => Err(ScrapeError::navigation(url, e.to_string())),
            Err(_) => Err(ScrapeError::navigation(
                url,
                format!("page load timed out after {}ms", timeout.as_millis()),
            )),
        }
    }

    async fn wait_for(&mut self, selector: &str) -> ScrapeResult<bool> {
        let deadline = Instant::now() + Duration::from_millis(self.config.element_wait_timeout_ms);
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!("Timed out waiting for element: {}", selector);
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, selector: &str) -> ScrapeResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Session(format!("element '{selector}' not found: {e}")))?;
        let _ = element.scroll_into_view().await;
        element
            .click()
            .await
            .map_err(|e| ScrapeError::Session(format!("click on '{selector}' failed: {e}")))?;
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> ScrapeResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Session(format!("element '{selector}' not found: {e}")))?;
        element
            .type_str(text)
            .await
            .map_err(|e| ScrapeError::Session(format!("typing into '{selector}' failed: {e}")))?;
        Ok(())
    }

    async fn press_key(&mut self, selector: &str, key: &str) -> ScrapeResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Session(format!("element '{selector}' not found: {e}")))?;
        element
            .press_key(key)
            .await
            .map_err(|e| ScrapeError::Session(format!("key '{key}' on '{selector}' failed: {e}")))?;
        Ok(())
    }

    async fn page_html(&mut self) -> ScrapeResult<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| ScrapeError::Session(format!("failed to read page HTML: {e}")))?;
        result
            .into_value()
            .map_err(|e| ScrapeError::Session(format!("failed to convert HTML result: {e:?}")))
    }

    async fn current_url(&mut self) -> ScrapeResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ScrapeError::Session(format!("failed to read URL: {e}")))?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(&mut self) -> ScrapeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Closing the browser tears the page down with it.
        if let Err(e) = self.browser.close().await {
            warn!("Closing browser failed: {}", e);
        }
        self.handler_task.abort();
        debug!("Browser session closed");
        Ok(())
    }
}
