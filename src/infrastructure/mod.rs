//! Infrastructure: browser session, persistence, probe, logging, config.

pub mod chromium;
pub mod config;
pub mod driver;
pub mod logging;
pub mod site_check;
pub mod store;

pub use chromium::ChromiumDriver;
pub use config::CrawlConfig;
pub use driver::{DriverConfig, PortalDriver};
pub use site_check::{SiteChecker, SiteStatus};
pub use store::CsvStore;
