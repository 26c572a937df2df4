//! HTTP page driver
//!
//! This module implements [`PageDriver`] for server-rendered listings:
//! - Building HTTP clients with the configured user agent
//! - Loading pages in a background task so `wait_for_idle` can bound them
//! - Answering selector queries against the last settled document
//! - Following link-like affordances on `click`
//! - Classifying refusals (403/429) apart from other HTTP failures

use crate::config::DriverConfig;
use crate::crawler::driver::{DriverError, DriverFactory, DriverResult, PageDriver};
use crate::crawler::parser::{select_elements, select_first, Element};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// A settled page
#[derive(Debug, Clone)]
struct LoadedPage {
    /// Final URL after redirects
    url: Url,
    /// Document body
    html: String,
}

/// A page load started by `navigate` or `click`
struct PendingLoad {
    url: Url,
    handle: JoinHandle<DriverResult<LoadedPage>>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The driver configuration
///
/// # Example
///
/// ```no_run
/// use climbwatch::config::DriverConfig;
/// use climbwatch::crawler::build_http_client;
///
/// let client = build_http_client(&DriverConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &DriverConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_millis(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and classifies the response
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `LoadedPage` |
/// | HTTP 403 / 429 | `Blocked` |
/// | Other status | `HttpStatus` |
/// | Transport error | `Request` |
async fn load_page(client: Client, url: Url) -> DriverResult<LoadedPage> {
    tracing::trace!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| DriverError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    let final_url = response.url().clone();

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DriverError::Blocked {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        return Err(DriverError::HttpStatus {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response.text().await.map_err(|source| DriverError::Request {
        url: final_url.to_string(),
        source,
    })?;

    Ok(LoadedPage {
        url: final_url,
        html,
    })
}

/// Page driver backed by plain HTTP requests
///
/// Documents are static once loaded, so a selector that doesn't match right
/// after load never will; `wait_for_selector` reports that as a timeout
/// without sleeping.
pub struct HttpPageDriver {
    client: Client,
    current: Option<LoadedPage>,
    pending: Option<PendingLoad>,
    closed: bool,
}

impl HttpPageDriver {
    /// Creates a driver with no page loaded
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
            pending: None,
            closed: false,
        }
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    fn page(&self) -> DriverResult<&LoadedPage> {
        self.ensure_open()?;
        self.current.as_ref().ok_or(DriverError::NoPage)
    }

    fn start_load(&mut self, url: Url) {
        if let Some(previous) = self.pending.take() {
            tracing::debug!("Abandoning pending load of {}", previous.url);
            previous.handle.abort();
        }

        let handle = tokio::spawn(load_page(self.client.clone(), url.clone()));
        self.pending = Some(PendingLoad { url, handle });
    }
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        let url = Url::parse(url).map_err(|e| DriverError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.start_load(url);
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let page = self.page()?;
        if select_first(&page.html, selector)?.is_some() {
            return Ok(());
        }

        Err(DriverError::Timeout {
            what: format!("selector '{}'", selector),
            after: timeout,
        })
    }

    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<Element>> {
        let page = self.page()?;
        select_elements(&page.html, selector)
    }

    async fn is_visible(&mut self, selector: &str) -> DriverResult<bool> {
        let page = self.page()?;
        Ok(select_first(&page.html, selector)?.is_some_and(|el| el.is_visible()))
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> DriverResult<Option<String>> {
        let page = self.page()?;
        let element = select_first(&page.html, selector)?;
        Ok(element.and_then(|el| el.attr(name).map(str::to_string)))
    }

    async fn click(&mut self, selector: &str) -> DriverResult<()> {
        let page = self.page()?;
        let element = select_first(&page.html, selector)?
            .ok_or_else(|| DriverError::NotFound(selector.to_string()))?;

        if !element.is_visible() {
            return Err(DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: "element is hidden".to_string(),
            });
        }

        let href = element.attr("href").ok_or_else(|| DriverError::NotInteractable {
            selector: selector.to_string(),
            reason: "element has no href".to_string(),
        })?;

        let target = page
            .url
            .join(href)
            .map_err(|e| DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: format!("cannot resolve href '{}': {}", href, e),
            })?;

        tracing::trace!("Click on '{}' follows {}", selector, target);
        self.start_load(target);
        Ok(())
    }

    async fn wait_for_idle(&mut self, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        let Some(mut pending) = self.pending.take() else {
            return Ok(());
        };

        match tokio::time::timeout(timeout, &mut pending.handle).await {
            Ok(Ok(Ok(page))) => {
                tracing::debug!("Page settled at {}", page.url);
                self.current = Some(page);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_error)) => Err(DriverError::LoadAborted(join_error.to_string())),
            Err(_elapsed) => {
                pending.handle.abort();
                Err(DriverError::Timeout {
                    what: format!("load of {}", pending.url),
                    after: timeout,
                })
            }
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
        self.current = None;
        self.closed = true;
        tracing::debug!("HTTP page driver closed");
        Ok(())
    }
}

impl Drop for HttpPageDriver {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

/// Opens [`HttpPageDriver`]s sharing one configured client
pub struct HttpDriverFactory {
    client: Client,
}

impl HttpDriverFactory {
    pub fn new(config: &DriverConfig) -> DriverResult<Self> {
        let client = build_http_client(config).map_err(DriverError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DriverFactory for HttpDriverFactory {
    async fn open(&self) -> DriverResult<Box<dyn PageDriver>> {
        Ok(Box::new(HttpPageDriver::new(self.client.clone())))
    }
}
