//! Texas portal profile for txschools.gov.
//!
//! The listing is a MUI data grid: school name and profile link in the first
//! column, district in the second, address in the third, grade range in the
//! fourth. Detail pages label the phone number with a "PHONE:" caption and
//! expose the school website as the first external button link.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{
    NextPage, PortalProfile, PortalSelectors, compile_selector, detect_next_page,
};
use crate::domain::{FilterSet, ScrapeError, ScrapeResult, SchoolRecord};
use crate::infrastructure::PortalDriver;

pub const LISTING_URL: &str = "https://txschools.gov/?view=schools&lng=en";
const BASE_URL: &str = "https://txschools.gov";

const ENRICHMENT_FIELDS: &[&str] = &["phone", "website"];

fn default_selectors() -> PortalSelectors {
    PortalSelectors {
        listing_ready: "table tbody tr".to_string(),
        row: "table tbody tr".to_string(),
        next_button: "button[aria-label*='Go to next page']".to_string(),
        next_disabled_marker: "disabled".to_string(),
        filter_input: "input[placeholder='Select a grade level']".to_string(),
        detail_ready: ".jss16".to_string(),
    }
}

pub struct TexasPortal {
    selectors: PortalSelectors,
    base_url: Url,
    row_selector: Selector,
    name_link_selector: Selector,
    district_selector: Selector,
    address_selector: Selector,
    grades_selector: Selector,
    next_button_selector: Selector,
    website_selector: Selector,
    phone_pattern: Regex,
}

impl TexasPortal {
    pub fn new() -> ScrapeResult<Self> {
        Self::with_selectors(default_selectors())
    }

    pub fn with_selectors(selectors: PortalSelectors) -> ScrapeResult<Self> {
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ScrapeError::selector(BASE_URL, e.to_string()))?;
        let phone_pattern =
            Regex::new(r"(?i)phone:?\s*(\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4})")
                .map_err(|e| ScrapeError::selector("phone pattern", e.to_string()))?;

        Ok(Self {
            row_selector: compile_selector(&selectors.row)?,
            next_button_selector: compile_selector(&selectors.next_button)?,
            name_link_selector: compile_selector("td:nth-child(1) a")?,
            district_selector: compile_selector("td:nth-child(2) a")?,
            address_selector: compile_selector("td:nth-child(3) div")?,
            grades_selector: compile_selector("td:nth-child(4)")?,
            website_selector: compile_selector("a.MuiButtonBase-root[href]")?,
            base_url,
            phone_pattern,
            selectors,
        })
    }

    fn element_text(element: &ElementRef, selector: &Selector) -> String {
        element
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Resolve a profile link against the portal origin. A link that will
    /// not resolve is kept verbatim rather than dropping the row.
    fn resolve_url(&self, href: &str) -> String {
        match self.base_url.join(href) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                debug!("Keeping unresolvable href '{}': {}", href, e);
                href.to_string()
            }
        }
    }
}

#[async_trait]
impl PortalProfile for TexasPortal {
    fn name(&self) -> &str {
        "texas"
    }

    fn listing_url(&self) -> &str {
        LISTING_URL
    }

    fn selectors(&self) -> &PortalSelectors {
        &self.selectors
    }

    fn category_field(&self) -> &str {
        "grades"
    }

    fn enrichment_fields(&self) -> &[&str] {
        ENRICHMENT_FIELDS
    }

    /// The grade-level filter is an autocomplete box: type a label, arrow
    /// down to the suggestion, confirm with Enter. One label at a time with
    /// a pause so the grid refreshes between selections.
    async fn apply_filters(
        &self,
        driver: &mut dyn PortalDriver,
        filters: &FilterSet,
        pause: Duration,
    ) -> ScrapeResult<()> {
        driver.navigate(self.listing_url()).await?;
        if filters.is_empty() {
            return Ok(());
        }

        let input = self.selectors.filter_input.clone();
        if !driver.wait_for(&input).await? {
            return Err(ScrapeError::navigation(
                self.listing_url(),
                format!("filter control '{input}' not present"),
            ));
        }

        for label in filters.labels() {
            driver.click(&input).await?;
            driver.type_text(&input, label).await?;
            driver.press_key(&input, "ArrowDown").await?;
            driver.press_key(&input, "Enter").await?;
            tokio::time::sleep(pause).await;
        }
        Ok(())
    }

    fn extract_rows(&self, html: &Html, page: u32) -> ScrapeResult<Vec<SchoolRecord>> {
        let mut records = Vec::new();

        for row in html.select(&self.row_selector) {
            let mut record = SchoolRecord::new();

            let (name, href) = row
                .select(&self.name_link_selector)
                .next()
                .map(|link| {
                    (
                        link.text().collect::<String>().trim().to_string(),
                        link.value().attr("href").unwrap_or_default().to_string(),
                    )
                })
                .unwrap_or_default();
            if name.is_empty() && href.is_empty() {
                warn!("Row on page {} has no school link, keeping as blank", page);
            }

            record.set("name", name);
            record.set(
                "url",
                if href.is_empty() {
                    String::new()
                } else {
                    self.resolve_url(&href)
                },
            );
            record.set("district", Self::element_text(&row, &self.district_selector));
            record.set("address", Self::element_text(&row, &self.address_selector));
            record.set("grades", Self::element_text(&row, &self.grades_selector));
            // Placeholders the enrichment phase fills in.
            record.set("phone", "");
            record.set("website", "");

            records.push(record);
        }

        if records.is_empty() {
            return Err(ScrapeError::page_parse(
                page,
                format!("no rows matched '{}'", self.selectors.row),
            ));
        }
        Ok(records)
    }

    fn next_page(&self, html: &Html) -> NextPage {
        detect_next_page(
            html,
            &self.next_button_selector,
            &self.selectors.next_disabled_marker,
        )
    }

    fn detail_url(&self, record: &SchoolRecord) -> Option<String> {
        record
            .get("url")
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    fn extract_detail(&self, html: &Html) -> Vec<(String, String)> {
        let mut found = Vec::new();

        let text = html.root_element().text().collect::<Vec<_>>().join(" ");
        if let Some(captures) = self.phone_pattern.captures(&text) {
            found.push(("phone".to_string(), captures[1].trim().to_string()));
        }

        let website = html.select(&self.website_selector).find_map(|element| {
            element
                .value()
                .attr("href")
                .filter(|href| href.starts_with("http"))
                .map(str::to_string)
        });
        if let Some(website) = website {
            found.push(("website".to_string(), website));
        }

        found
    }
}
