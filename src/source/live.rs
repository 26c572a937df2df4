//! Live listing source

use crate::config::Config;
use crate::crawler::{self, DriverFactory};
use crate::state::AccumulatedResult;
use crate::ClimbError;
use tokio_util::sync::CancellationToken;

/// Crawls the configured listing with a fresh driver per run
pub struct LiveSource {
    config: Config,
    factory: Box<dyn DriverFactory>,
}

impl LiveSource {
    pub fn new(config: Config, factory: Box<dyn DriverFactory>) -> Self {
        Self { config, factory }
    }

    /// Runs one crawl; the driver is closed on every exit path
    pub async fn crawl(&self, cancel: &CancellationToken) -> Result<AccumulatedResult, ClimbError> {
        tracing::info!("Starting scraper for {}", self.config.crawler.listing_url);
        crawler::crawl(&self.config, self.factory.as_ref(), cancel).await
    }
}
