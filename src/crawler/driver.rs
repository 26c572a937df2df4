//! Page driver boundary
//!
//! The crawl controller never touches a browser or an HTTP client directly.
//! It talks to a [`PageDriver`], which owns one rendered page at a time and
//! answers selector queries against it.

use crate::crawler::parser::Element;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a page driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("No element matches '{0}'")]
    NotFound(String),

    #[error("Element '{selector}' cannot be interacted with: {reason}")]
    NotInteractable { selector: String, reason: String },

    #[error("Blocked by remote (HTTP {status}) at {url}")]
    Blocked { url: String, status: u16 },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Page load aborted: {0}")]
    LoadAborted(String),

    #[error("Invalid selector: '{0}'")]
    InvalidSelector(String),

    #[error("No page has been loaded")]
    NoPage,

    #[error("Driver is closed")]
    Closed,
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// A handle on one remotely rendered page
///
/// Loads are asynchronous: `navigate` and `click` start a transition and
/// `wait_for_idle` blocks until it has settled. Queries always run against
/// the last settled page.
#[async_trait]
pub trait PageDriver: Send {
    /// Starts loading `url`
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Waits until at least one element matches `selector`
    ///
    /// Fails with [`DriverError::Timeout`] if nothing matches within `timeout`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Returns every element matching `selector`, in document order
    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<Element>>;

    /// Returns whether the first element matching `selector` is visible
    async fn is_visible(&mut self, selector: &str) -> DriverResult<bool>;

    /// Reads an attribute of the first element matching `selector`
    async fn attribute(&mut self, selector: &str, name: &str) -> DriverResult<Option<String>>;

    /// Activates the first element matching `selector`
    async fn click(&mut self, selector: &str) -> DriverResult<()>;

    /// Waits until no page transition is pending
    async fn wait_for_idle(&mut self, timeout: Duration) -> DriverResult<()>;

    /// Releases the driver; further calls fail with [`DriverError::Closed`]
    async fn close(&mut self) -> DriverResult<()>;
}

/// Acquires fresh page drivers
///
/// Each crawl run opens its own driver; nothing is shared between runs.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open(&self) -> DriverResult<Box<dyn PageDriver>>;
}
