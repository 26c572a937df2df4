//! Crawl controller - main crawl orchestration logic
//!
//! This module contains the loop that walks a paginated listing:
//! - Initial navigation, fatal on failure
//! - Card wait, extraction and global numbering per page
//! - Page ceiling and next-affordance checks
//! - Paced pagination with tagged failures and bounded retries
//! - Cooperative cancellation at every suspension point

use crate::config::CrawlerConfig;
use crate::crawler::driver::PageDriver;
use crate::crawler::extractor::PageExtractor;
use crate::crawler::pacer::Pacer;
use crate::crawler::pagination::PaginationDriver;
use crate::state::{AccumulatedResult, Accumulator, PaginationFailure, StopReason};
use crate::ClimbError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs `fut` unless `cancel` fires first
async fn or_cancel<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Why advancing stopped the loop
enum AdvanceStop {
    Failed(PaginationFailure),
    Cancelled,
}

/// Drives one page driver through a paginated listing
pub struct CrawlController {
    extractor: PageExtractor,
    pagination: PaginationDriver,
    pacer: Pacer,
    card_selector: String,
    navigation_timeout: Duration,
    card_timeout: Duration,
    advance_retries: u32,
    retry_backoff: Duration,
}

impl CrawlController {
    /// Creates a controller from crawler settings and a pacer
    ///
    /// # Arguments
    ///
    /// * `config` - Selectors, timeouts and retry policy
    /// * `pacer` - Delay source used before every pagination click
    pub fn new(config: &CrawlerConfig, pacer: Pacer) -> Self {
        Self {
            extractor: PageExtractor::new(&config.card_selector, &config.name_selector),
            pagination: PaginationDriver::from_config(config),
            pacer,
            card_selector: config.card_selector.clone(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout),
            card_timeout: Duration::from_millis(config.card_timeout),
            advance_retries: config.advance_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff),
        }
    }

    /// Crawls `listing_url` for at most `max_pages` pages
    ///
    /// This is the core crawling logic that:
    /// 1. Navigates to the listing and waits for it to settle
    /// 2. Waits for result cards; none means the data has run out
    /// 3. Extracts names and numbers them continuing from earlier pages
    /// 4. Stops at the page ceiling or when no next affordance is usable
    /// 5. Pauses, then advances to the next page
    ///
    /// # Returns
    ///
    /// * `Ok(AccumulatedResult)` - Everything collected, including partial runs
    /// * `Err(ClimbError::NavigationFailed)` - The listing never loaded
    /// * `Err(ClimbError::Cancelled)` - Cancelled before the listing loaded
    ///
    /// The driver is left open; releasing it is the caller's job.
    pub async fn run(
        &self,
        driver: &mut dyn PageDriver,
        listing_url: &str,
        max_pages: u32,
        cancel: &CancellationToken,
    ) -> Result<AccumulatedResult, ClimbError> {
        let max_pages = max_pages.max(1);

        tracing::info!("Navigating to initial page {}", listing_url);
        self.initial_navigation(driver, listing_url, cancel).await?;

        tracing::info!("Starting pagination loop (max {} pages)...", max_pages);

        let mut accumulated = Accumulator::new();
        let mut current_page: u32 = 1;
        let mut pages_visited: u32 = 0;

        let stop_reason = loop {
            tracing::info!("--- Scraping page {} ---", current_page);

            match or_cancel(cancel, driver.wait_for_selector(&self.card_selector, self.card_timeout))
                .await
            {
                None => break StopReason::Cancelled,
                Some(Err(e)) => {
                    tracing::info!(
                        "No search results found on page {} ({}), assuming end.",
                        current_page,
                        e
                    );
                    break StopReason::NoDataFound;
                }
                Some(Ok(())) => {}
            }

            let names = self.extractor.extract(driver).await;
            let added = accumulated.extend_page(names);
            pages_visited = current_page;

            tracing::info!(
                "Found {} restaurants on page {}. Total found: {}",
                added,
                current_page,
                accumulated.len()
            );

            if added == 0 {
                break StopReason::NoDataFound;
            }

            if current_page >= max_pages {
                tracing::info!("Reached max pages limit ({}). Stopping pagination.", max_pages);
                break StopReason::PageCeiling;
            }

            if !self.pagination.has_next(driver).await {
                break StopReason::NoNextPage;
            }

            if !self.pacer.pause(cancel).await {
                break StopReason::Cancelled;
            }

            match self.advance_with_retries(driver, cancel).await {
                Ok(()) => {}
                Err(AdvanceStop::Cancelled) => break StopReason::Cancelled,
                Err(AdvanceStop::Failed(failure)) => {
                    tracing::warn!(
                        "Error clicking next button or waiting for page {}: {}",
                        current_page + 1,
                        failure
                    );
                    break StopReason::PaginationFailed(failure);
                }
            }

            current_page += 1;
        };

        if stop_reason == StopReason::Cancelled {
            if accumulated.is_empty() {
                tracing::warn!("Crawl cancelled before any restaurant was collected");
            } else {
                tracing::warn!("Crawl cancelled; keeping {} restaurants", accumulated.len());
            }
        }

        tracing::info!(
            "Scraping finished ({}). Total restaurants scraped: {}",
            stop_reason,
            accumulated.len()
        );

        Ok(accumulated.finish(pages_visited, Some(stop_reason)))
    }

    /// Loads the listing and waits for it to settle within the navigation timeout
    async fn initial_navigation(
        &self,
        driver: &mut dyn PageDriver,
        listing_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ClimbError> {
        let deadline = self.navigation_timeout;
        let load = async {
            driver.navigate(listing_url).await?;
            driver.wait_for_idle(deadline).await
        };

        match or_cancel(cancel, tokio::time::timeout(deadline, load)).await {
            None => Err(ClimbError::Cancelled),
            Some(Err(_elapsed)) => Err(ClimbError::NavigationFailed {
                url: listing_url.to_string(),
                reason: format!("page did not settle within {:?}", deadline),
            }),
            Some(Ok(Err(e))) => Err(ClimbError::NavigationFailed {
                url: listing_url.to_string(),
                reason: e.to_string(),
            }),
            Some(Ok(Ok(()))) => Ok(()),
        }
    }

    /// Advances one page, retrying transient failures with doubling backoff
    async fn advance_with_retries(
        &self,
        driver: &mut dyn PageDriver,
        cancel: &CancellationToken,
    ) -> Result<(), AdvanceStop> {
        let mut attempt: u32 = 0;

        loop {
            let outcome = or_cancel(cancel, self.pagination.advance(driver))
                .await
                .ok_or(AdvanceStop::Cancelled)?;

            match outcome {
                Ok(()) => return Ok(()),
                Err(failure) if failure.kind.is_retryable() && attempt < self.advance_retries => {
                    attempt += 1;
                    let backoff = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                    tracing::warn!(
                        "Pagination attempt {} failed ({}); retrying in {:?}",
                        attempt,
                        failure,
                        backoff
                    );
                    or_cancel(cancel, tokio::time::sleep(backoff))
                        .await
                        .ok_or(AdvanceStop::Cancelled)?;
                }
                Err(failure) => return Err(AdvanceStop::Failed(failure)),
            }
        }
    }
}
