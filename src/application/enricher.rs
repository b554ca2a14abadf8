//! Enrichment phase: fill contact fields record by record.
//!
//! Strictly sequential: one detail-page round-trip per record. Records that
//! already carry every enrichment field are skipped without spending a
//! navigation. A record whose lookup fails is logged and left as it was; one
//! miss never aborts the run. The merge is monotonic: only empty fields are
//! ever written.

use scraper::Html;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::{ScrapeError, ScrapeResult};
use crate::infrastructure::{CrawlConfig, CsvStore, PortalDriver};
use crate::portal::PortalProfile;

/// Progress log cadence, in visited records.
const PROGRESS_EVERY: usize = 10;

/// What an enrichment run did, for the final statistics block.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub visited: usize,
    pub already_complete: usize,
    pub misses: usize,
    /// Records with a non-empty value per enrichment field, after the run.
    pub field_counts: Vec<(String, usize)>,
}

pub struct Enricher<P: PortalProfile> {
    profile: P,
    config: CrawlConfig,
}

impl<P: PortalProfile> Enricher<P> {
    pub fn new(profile: P, config: CrawlConfig) -> Self {
        Self { profile, config }
    }

    /// Enrich every record of the store at `input`, writing the result (and
    /// periodic checkpoints) to `output`.
    pub async fn run(
        &self,
        driver: &mut dyn PortalDriver,
        input: &Path,
        output: &Path,
    ) -> ScrapeResult<EnrichmentSummary> {
        let output_file = CsvStore::new(output);
        let mut store = CsvStore::new(input).load()?;
        for field in self.profile.enrichment_fields() {
            store.ensure_column(field);
        }

        let total = store.len();
        info!(
            "Enriching {} records from {} into {}",
            total,
            input.display(),
            output.display()
        );

        let mut visited = 0usize;
        let mut already_complete = 0usize;
        let mut misses = 0usize;
        let detail_ready = self.profile.selectors().detail_ready.clone();

        for index in 0..total {
            let Some(record) = store.get(index) else {
                break;
            };
            let label = self.profile.record_label(record);

            let complete = self
                .profile
                .enrichment_fields()
                .iter()
                .all(|field| !record.is_field_empty(field));
            if complete {
                debug!("Skipping '{}', already has complete data", label);
                already_complete += 1;
                continue;
            }

            let Some(url) = self.profile.detail_url(record) else {
                warn!(
                    "{}",
                    ScrapeError::enrichment_miss(&label, "record has no detail link")
                );
                misses += 1;
                continue;
            };

            if let Err(e) = driver.navigate(&url).await {
                match e {
                    // A detail page that will not load is this record's
                    // problem, not the run's.
                    ScrapeError::Navigation { reason, .. } => {
                        warn!("{}", ScrapeError::enrichment_miss(&label, reason));
                        misses += 1;
                        continue;
                    }
                    other => return Err(other),
                }
            }
            if !driver.wait_for(&detail_ready).await? {
                debug!("Detail marker '{}' absent for '{}'", detail_ready, label);
            }

            let html_text = driver.page_html().await?;
            let found = {
                let html = Html::parse_document(&html_text);
                self.profile.extract_detail(&html)
            };

            let Some(record) = store.get_mut(index) else {
                break;
            };
            if found.is_empty() {
                warn!(
                    "{}",
                    ScrapeError::enrichment_miss(&label, "no supplemental fields on detail page")
                );
                misses += 1;
            } else {
                for (field, value) in found {
                    if record.set_if_empty(&field, value) {
                        info!("Updated {} for '{}'", field, label);
                    }
                }
            }

            visited += 1;
            if visited % PROGRESS_EVERY == 0 {
                info!("Processed {}/{} records", visited, total);
            }
            if visited % self.config.checkpoint_every_records == 0 {
                output_file.save(&store)?;
            }
            tokio::time::sleep(self.config.request_delay()).await;
        }

        output_file.save(&store)?;

        let field_counts: Vec<(String, usize)> = self
            .profile
            .enrichment_fields()
            .iter()
            .map(|field| {
                let count = store.iter().filter(|r| !r.is_field_empty(field)).count();
                (field.to_string(), count)
            })
            .collect();

        info!(
            "Enrichment completed: {} records, {} visited, {} already complete, {} misses",
            total, visited, already_complete, misses
        );
        for (field, count) in &field_counts {
            info!("  {}: {}/{} records filled", field, count, total);
        }

        Ok(EnrichmentSummary {
            total,
            visited,
            already_complete,
            misses,
            field_counts,
        })
    }
}
