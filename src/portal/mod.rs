//! Portal profiles: the per-state extension point.
//!
//! A profile supplies everything that differs between state portals: the
//! listing URL, CSS locators, how the filter UI is driven, how a listing row
//! becomes a record, and where a record's detail view lives. The collection
//! and enrichment loops in `application` are written once against this trait.

pub mod texas;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{FilterSet, ScrapeError, ScrapeResult, SchoolRecord};
use crate::infrastructure::PortalDriver;

pub use texas::TexasPortal;

/// CSS locators for one state's portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSelectors {
    /// Element whose presence means the listing has rendered.
    pub listing_ready: String,
    /// One listing row.
    pub row: String,
    /// The next-page control.
    pub next_button: String,
    /// Class fragment marking the next-page control as disabled.
    pub next_disabled_marker: String,
    /// The grade-level filter input.
    pub filter_input: String,
    /// Element whose presence means a detail page has rendered.
    pub detail_ready: String,
}

/// State of the pagination control on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// No control in the DOM; last page.
    Absent,
    /// Control present but inert; last page.
    Disabled,
    /// Control present and clickable.
    Ready,
}

/// One state's portal: selectors, extraction rules, and filter interaction.
#[async_trait]
pub trait PortalProfile: Send + Sync {
    /// Short name for logs ("texas").
    fn name(&self) -> &str;

    /// Entry URL of the school listing.
    fn listing_url(&self) -> &str;

    fn selectors(&self) -> &PortalSelectors;

    /// Record field matched against the filter labels.
    fn category_field(&self) -> &str;

    /// Fields the enrichment phase is responsible for filling.
    fn enrichment_fields(&self) -> &[&str];

    /// Navigate to the listing and drive the filter UI. Called once at run
    /// start; with an empty filter set only the navigation happens.
    async fn apply_filters(
        &self,
        driver: &mut dyn PortalDriver,
        filters: &FilterSet,
        pause: Duration,
    ) -> ScrapeResult<()>;

    /// Extract one record per listing row on the current page.
    fn extract_rows(&self, html: &Html, page: u32) -> ScrapeResult<Vec<SchoolRecord>>;

    /// Inspect the pagination control on the current page.
    fn next_page(&self, html: &Html) -> NextPage;

    /// Where the detail view for this record lives, if the record carries
    /// enough to derive it.
    fn detail_url(&self, record: &SchoolRecord) -> Option<String>;

    /// Pull supplemental (field, value) pairs from a detail page. Only
    /// fields that were actually found are returned.
    fn extract_detail(&self, html: &Html) -> Vec<(String, String)>;

    /// Identity used for cross-page duplicate suppression. Listing rows have
    /// no enforced key, so fall back to the detail link or name+address.
    fn record_key(&self, record: &SchoolRecord) -> String {
        self.detail_url(record).unwrap_or_else(|| {
            format!(
                "{}|{}",
                record.get("name").unwrap_or_default(),
                record.get("address").unwrap_or_default()
            )
        })
    }

    /// Human-readable record label for log lines.
    fn record_label(&self, record: &SchoolRecord) -> String {
        record.get("name").unwrap_or("<unnamed>").to_string()
    }
}

/// Compile a CSS selector, surfacing the portal's selector in the error.
pub(crate) fn compile_selector(selector: &str) -> ScrapeResult<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::selector(selector, e.to_string()))
}

/// Shared next-page detection: absent control, `disabled` attribute, an
/// `aria-disabled` flag, or a marker fragment in the class list.
pub(crate) fn detect_next_page(
    html: &Html,
    next_button: &Selector,
    disabled_marker: &str,
) -> NextPage {
    match html.select(next_button).next() {
        None => NextPage::Absent,
        Some(element) => {
            let value = element.value();
            let disabled = value.attr("disabled").is_some()
                || value.attr("aria-disabled") == Some("true")
                || value
                    .attr("class")
                    .is_some_and(|classes| classes.contains(disabled_marker));
            if disabled {
                NextPage::Disabled
            } else {
                NextPage::Ready
            }
        }
    }
}
