//! Pagination driver
//!
//! Decides whether a usable "next" affordance exists and performs the
//! transition to the following page.

use crate::config::{CrawlerConfig, NextCheck};
use crate::crawler::driver::{DriverError, PageDriver};
use crate::state::{FailureKind, PaginationFailure};
use std::time::Duration;

/// Moves a page driver through a paginated listing
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    next_selector: String,
    next_check: NextCheck,
    idle_timeout: Duration,
}

impl PaginationDriver {
    pub fn new(next_selector: impl Into<String>, next_check: NextCheck, idle_timeout: Duration) -> Self {
        Self {
            next_selector: next_selector.into(),
            next_check,
            idle_timeout,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.next_selector.clone(),
            config.next_check,
            Duration::from_millis(config.idle_timeout),
        )
    }

    /// Returns true if the next affordance is present and usable
    ///
    /// Under [`NextCheck::Visible`] a visible control counts as usable even
    /// when it is disabled; the following `advance` then fails on its idle
    /// timeout instead of stopping cleanly here.
    pub async fn has_next(&self, driver: &mut dyn PageDriver) -> bool {
        match driver.is_visible(&self.next_selector).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Next button is not visible. Assuming end of pagination.");
                return false;
            }
            Err(e) => {
                tracing::warn!("Could not check next button '{}': {}", self.next_selector, e);
                return false;
            }
        }

        if self.next_check == NextCheck::Enabled && self.is_disabled(driver).await {
            tracing::info!("Next button is disabled. Reached the last page.");
            return false;
        }

        true
    }

    async fn is_disabled(&self, driver: &mut dyn PageDriver) -> bool {
        let aria = driver
            .attribute(&self.next_selector, "aria-disabled")
            .await
            .ok()
            .flatten();
        if aria.is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            return true;
        }

        matches!(
            driver.attribute(&self.next_selector, "disabled").await,
            Ok(Some(_))
        )
    }

    /// Clicks the next affordance and waits for the new page to settle
    pub async fn advance(&self, driver: &mut dyn PageDriver) -> Result<(), PaginationFailure> {
        driver
            .click(&self.next_selector)
            .await
            .map_err(|e| classify(&e))?;

        tracing::debug!("Clicked next page. Waiting for navigation...");

        driver
            .wait_for_idle(self.idle_timeout)
            .await
            .map_err(|e| classify(&e))
    }
}

/// Maps a driver error to a pagination failure class
pub fn classify(error: &DriverError) -> PaginationFailure {
    let kind = match error {
        DriverError::Blocked { .. } => FailureKind::Blocked,
        DriverError::Timeout { .. }
        | DriverError::Request { .. }
        | DriverError::LoadAborted(_) => FailureKind::Transient,
        DriverError::HttpStatus { status, .. } if *status >= 500 => FailureKind::Transient,
        DriverError::HttpStatus { .. }
        | DriverError::NotFound(_)
        | DriverError::NotInteractable { .. }
        | DriverError::InvalidUrl { .. }
        | DriverError::InvalidSelector(_)
        | DriverError::Client(_)
        | DriverError::NoPage
        | DriverError::Closed => FailureKind::Exhausted,
    };

    PaginationFailure::new(kind, error.to_string())
}
