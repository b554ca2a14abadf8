//! Collection phase: drive the listing's pagination and build the store.
//!
//! One pass over the portal's result pages. Filters are applied through the
//! portal UI once, then each page contributes its rows: category-filtered,
//! deduplicated across page boundaries, appended in page-then-row order. The
//! store is checkpointed to disk on a page cadence so an interrupted run
//! loses at most the pages since the last write.

use scraper::Html;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::{FilterSet, RecordStore, ScrapeError, ScrapeResult};
use crate::infrastructure::{CrawlConfig, CsvStore, PortalDriver};
use crate::portal::{NextPage, PortalProfile};

pub struct Collector<P: PortalProfile> {
    profile: P,
    config: CrawlConfig,
}

impl<P: PortalProfile> Collector<P> {
    pub fn new(profile: P, config: CrawlConfig) -> Self {
        Self { profile, config }
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    /// Collect every matching row into `output`. The driver is owned by the
    /// caller, which is responsible for closing it when the run ends.
    pub async fn run(
        &self,
        driver: &mut dyn PortalDriver,
        filters: &FilterSet,
        output: &Path,
    ) -> ScrapeResult<RecordStore> {
        let store_file = CsvStore::new(output);
        if filters.is_empty() {
            info!("Collecting '{}' listing, no filters", self.profile.name());
        } else {
            info!(
                "Collecting '{}' listing, filters: {}",
                self.profile.name(),
                filters.labels().join(", ")
            );
        }

        self.profile
            .apply_filters(driver, filters, self.config.request_delay())
            .await?;

        let mut store = RecordStore::new();
        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        loop {
            let ready = driver
                .wait_for(&self.profile.selectors().listing_ready)
                .await?;
            if !ready && page == 1 {
                // Structurally unexpected on first load: fatal, no retry.
                return Err(ScrapeError::navigation(
                    self.profile.listing_url(),
                    format!(
                        "listing structure '{}' never appeared",
                        self.profile.selectors().listing_ready
                    ),
                ));
            }

            let html_text = driver.page_html().await?;
            let (rows, next) = {
                let html = Html::parse_document(&html_text);
                let rows = if ready {
                    self.profile.extract_rows(&html, page)
                } else {
                    Err(ScrapeError::page_parse(
                        page,
                        "listing structure did not appear".to_string(),
                    ))
                };
                (rows, self.profile.next_page(&html))
            };

            match rows {
                Ok(rows) => {
                    let mut kept = 0usize;
                    for record in rows {
                        let category = record
                            .get(self.profile.category_field())
                            .unwrap_or_default();
                        if !filters.matches(category) {
                            continue;
                        }
                        let key = self.profile.record_key(&record);
                        if !seen_keys.insert(key) {
                            debug!(
                                "Duplicate row '{}' on page {}, skipping",
                                self.profile.record_label(&record),
                                page
                            );
                            continue;
                        }
                        store.push(record);
                        kept += 1;
                    }
                    info!("Page {}: kept {} rows ({} total)", page, kept, store.len());
                }
                // One page's extraction failing is not fatal as long as
                // pagination can still advance.
                Err(e) => warn!("Skipping page {}: {}", page, e),
            }

            if page % self.config.checkpoint_every_pages == 0 {
                store_file.save(&store)?;
            }

            match next {
                NextPage::Absent | NextPage::Disabled => {
                    info!("Reached last page ({})", page);
                    break;
                }
                NextPage::Ready => {
                    if page >= self.config.max_pages {
                        warn!(
                            "Stopping at defensive page bound ({})",
                            self.config.max_pages
                        );
                        break;
                    }
                    if let Err(e) = driver.click(&self.profile.selectors().next_button).await {
                        warn!("Next-page click failed, stopping pagination: {}", e);
                        break;
                    }
                    page += 1;
                    tokio::time::sleep(self.config.request_delay()).await;
                }
            }
        }

        store_file.save(&store)?;
        info!(
            "Collection finished: {} records across {} page(s), saved to {}",
            store.len(),
            page,
            output.display()
        );
        Ok(store)
    }
}
