//! Snapshot sources
//!
//! A run gets its ranking either from the live listing or from the mock
//! generator. Both produce the same [`AccumulatedResult`] shape.

mod live;
mod mock;

pub use live::LiveSource;
pub use mock::{MockSource, MOCK_RESTAURANT_NAMES};

use crate::config::{Config, SourceMode};
use crate::crawler::HttpDriverFactory;
use crate::state::AccumulatedResult;
use crate::ClimbError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Something that can produce one day's ranking
#[async_trait]
pub trait SnapshotProducer: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn produce(&mut self, cancel: &CancellationToken) -> Result<AccumulatedResult, ClimbError>;
}

#[async_trait]
impl SnapshotProducer for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn produce(&mut self, cancel: &CancellationToken) -> Result<AccumulatedResult, ClimbError> {
        self.crawl(cancel).await
    }
}

#[async_trait]
impl SnapshotProducer for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn produce(&mut self, _cancel: &CancellationToken) -> Result<AccumulatedResult, ClimbError> {
        tracing::info!("Generating {} mock restaurants", self.count());
        Ok(self.generate())
    }
}

/// Builds the producer for `mode`
///
/// # Returns
///
/// * `Ok(Box<dyn SnapshotProducer>)` - Ready to produce
/// * `Err(ClimbError::Driver)` - The HTTP client could not be built
pub fn build_producer(config: &Config, mode: SourceMode) -> Result<Box<dyn SnapshotProducer>, ClimbError> {
    match mode {
        SourceMode::Live => {
            let factory = HttpDriverFactory::new(&config.driver)?;
            Ok(Box::new(LiveSource::new(config.clone(), Box::new(factory))))
        }
        SourceMode::Mock => Ok(Box::new(MockSource::new(config.mock.count as usize))),
    }
}
