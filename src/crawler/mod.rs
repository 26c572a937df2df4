//! Crawler module for walking a paginated listing
//!
//! This module contains the core crawling logic, including:
//! - The page driver boundary and its HTTP implementation
//! - Selector queries and name extraction
//! - Randomized pacing between pagination clicks
//! - Pagination with tagged failures
//! - Overall crawl control

mod coordinator;
mod driver;
mod extractor;
mod fetcher;
mod pacer;
mod pagination;
mod parser;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::CrawlController;
pub use driver::{DriverError, DriverFactory, DriverResult, PageDriver};
pub use extractor::{extract_names, ExtractedNames, PageExtractor};
pub use fetcher::{build_http_client, HttpDriverFactory, HttpPageDriver};
pub use pacer::{random_delay, Pacer};
pub use pagination::{classify, PaginationDriver};
pub use parser::{parse_selector, select_elements, select_first, Element};

use crate::config::Config;
use crate::state::AccumulatedResult;
use crate::ClimbError;
use tokio_util::sync::CancellationToken;

/// Runs one complete live crawl against a fresh driver
///
/// This is the main entry point for a live crawl. It will:
/// 1. Open a page driver from `factory`
/// 2. Walk the configured listing up to its page ceiling
/// 3. Close the driver whatever the outcome
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `factory` - Source of page drivers
/// * `cancel` - Token that stops the crawl at its next suspension point
///
/// # Returns
///
/// * `Ok(AccumulatedResult)` - Everything collected, possibly partial
/// * `Err(ClimbError)` - The driver could not be opened or the listing never loaded
pub async fn crawl(
    config: &Config,
    factory: &dyn DriverFactory,
    cancel: &CancellationToken,
) -> Result<AccumulatedResult, ClimbError> {
    let controller = CrawlController::new(&config.crawler, Pacer::from_config(&config.pacing));

    let mut driver = factory.open().await?;
    let result = controller
        .run(
            driver.as_mut(),
            &config.crawler.listing_url,
            config.crawler.max_pages,
            cancel,
        )
        .await;

    if let Err(e) = driver.close().await {
        tracing::warn!("Failed to close page driver: {}", e);
    }

    result
}
