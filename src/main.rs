//! Collect Texas school records, then enrich them with contact details.
//!
//! No flags: filters and file names are fixed, and the process exits
//! non-zero only when a run dies on an unrecoverable error.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use school_scout::application::{Collector, Enricher};
use school_scout::domain::FilterSet;
use school_scout::infrastructure::{
    ChromiumDriver, CrawlConfig, PortalDriver, SiteChecker, logging,
};
use school_scout::portal::{PortalProfile, TexasPortal};

const BASIC_DATA_FILE: &str = "texas_schools_basic_data.csv";
const ENRICHED_DATA_FILE: &str = "texas_schools_enriched_data.csv";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let config = CrawlConfig::default();
    let filters = FilterSet::new(["Prekindergarten", "Kindergarten", "Early Education"]);
    let basic_path = Path::new(BASIC_DATA_FILE);
    let enriched_path = Path::new(ENRICHED_DATA_FILE);

    let portal = TexasPortal::new().context("failed to build Texas portal profile")?;

    // Cheap reachability probe before any browser spends time on it.
    let checker = SiteChecker::new(&config.user_agent, config.driver.page_load_timeout_ms)?;
    checker.check(portal.listing_url()).await?;

    // Phase 1: collect the filtered listing.
    let collector = Collector::new(portal, config.clone());
    let mut driver = ChromiumDriver::launch(config.driver.clone())
        .await
        .context("failed to launch browser for collection")?;
    let collected = collector.run(&mut driver, &filters, basic_path).await;
    driver.close().await.ok();
    let collected = collected.context("collection run failed")?;
    info!("Collected {} schools", collected.len());

    // Phase 2: enrich from each school's detail page, in a fresh session.
    let portal = TexasPortal::new().context("failed to build Texas portal profile")?;
    let enricher = Enricher::new(portal, config.clone());
    let mut driver = ChromiumDriver::launch(config.driver)
        .await
        .context("failed to launch browser for enrichment")?;
    let summary = enricher.run(&mut driver, basic_path, enriched_path).await;
    driver.close().await.ok();
    let summary = summary.context("enrichment run failed")?;

    if let Ok(summary_json) = serde_json::to_string(&summary) {
        info!("Enrichment summary: {}", summary_json);
    }
    info!(
        "Done: {} schools, {} enrichment misses, output in {}",
        summary.total,
        summary.misses,
        enriched_path.display()
    );
    Ok(())
}
