//! Scripted page driver for unit tests
//!
//! Pages are rendered to HTML and queried with the same helpers the HTTP
//! driver uses, so selector behavior matches production.

use crate::crawler::driver::{DriverError, DriverFactory, DriverResult, PageDriver};
use crate::crawler::parser::{select_elements, select_first, Element};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a page presents its next affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextButton {
    Absent,
    Visible,
    Hidden,
    /// `aria-disabled="true"`
    Disabled,
    /// Bare `disabled` attribute
    Inert,
}

/// One listing page: card names (`None` = card without a name) and its next button
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    pub names: Vec<Option<String>>,
    pub next: NextButton,
}

impl ScriptedPage {
    pub fn new(names: Vec<Option<String>>) -> Self {
        Self {
            names,
            next: NextButton::Visible,
        }
    }

    pub fn named(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| Some(n.to_string())).collect())
    }

    pub fn with_next(mut self, next: NextButton) -> Self {
        self.next = next;
        self
    }

    fn render(&self, index: usize) -> String {
        let mut html = String::from("<html><body>");
        for name in &self.names {
            match name {
                Some(name) => html.push_str(&format!(
                    r#"<div class="SearchResult"><h3>{}</h3></div>"#,
                    name
                )),
                None => html.push_str(r#"<div class="SearchResult"><span>?</span></div>"#),
            }
        }
        let href = format!("/list?page={}", index + 2);
        match self.next {
            NextButton::Absent => {}
            NextButton::Visible => {
                html.push_str(&format!(r#"<a rel="next" href="{}">Next</a>"#, href))
            }
            NextButton::Hidden => html.push_str(&format!(
                r#"<a rel="next" href="{}" style="display: none">Next</a>"#,
                href
            )),
            NextButton::Disabled => html.push_str(&format!(
                r#"<a rel="next" href="{}" aria-disabled="true">Next</a>"#,
                href
            )),
            NextButton::Inert => html.push_str(&format!(
                r#"<a rel="next" href="{}" disabled>Next</a>"#,
                href
            )),
        }
        html.push_str("</body></html>");
        html
    }
}

/// Interactions observed by a scripted driver
#[derive(Debug, Default)]
pub struct DriverLog {
    pub navigations: Vec<String>,
    pub clicks: usize,
    pub closed: bool,
}

/// In-memory page driver following a fixed script
pub struct ScriptedDriver {
    pages: Vec<ScriptedPage>,
    current: Option<usize>,
    pending: Option<usize>,
    navigation_error: Option<DriverError>,
    click_failures: HashMap<usize, VecDeque<DriverError>>,
    hang_cards_on: Option<usize>,
    log: Arc<Mutex<DriverLog>>,
}

impl ScriptedDriver {
    /// Creates a driver with nothing loaded yet
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages,
            current: None,
            pending: None,
            navigation_error: None,
            click_failures: HashMap::new(),
            hang_cards_on: None,
            log: Arc::new(Mutex::new(DriverLog::default())),
        }
    }

    /// Creates a driver already showing the first page
    pub fn loaded(pages: Vec<ScriptedPage>) -> Self {
        let mut driver = Self::new(pages);
        driver.current = Some(0);
        driver
    }

    /// Pages of the given sizes; every page but the last has a visible next button
    pub fn listing(sizes: &[usize]) -> Self {
        let last = sizes.len().saturating_sub(1);
        let pages = sizes
            .iter()
            .enumerate()
            .map(|(p, &size)| {
                let names = (1..=size)
                    .map(|i| Some(format!("Restaurant {}-{}", p + 1, i)))
                    .collect();
                let next = if p == last {
                    NextButton::Absent
                } else {
                    NextButton::Visible
                };
                ScriptedPage::new(names).with_next(next)
            })
            .collect();
        Self::new(pages)
    }

    /// Makes the initial navigation fail with `error`
    pub fn fail_navigation(mut self, error: DriverError) -> Self {
        self.navigation_error = Some(error);
        self
    }

    /// Queues `error` for the next click made on page `page` (0-based)
    pub fn fail_click(mut self, page: usize, error: DriverError) -> Self {
        self.click_failures.entry(page).or_default().push_back(error);
        self
    }

    /// Makes the card wait on page `page` (0-based) never return
    pub fn hang_cards_on(mut self, page: usize) -> Self {
        self.hang_cards_on = Some(page);
        self
    }

    /// Shared handle on the interaction log
    pub fn log(&self) -> Arc<Mutex<DriverLog>> {
        Arc::clone(&self.log)
    }

    /// Index of the settled page
    pub fn current_page(&self) -> Option<usize> {
        self.current
    }

    fn html(&self) -> DriverResult<String> {
        if self.log.lock().unwrap().closed {
            return Err(DriverError::Closed);
        }
        let index = self.current.ok_or(DriverError::NoPage)?;
        Ok(self.pages[index].render(index))
    }
}

pub fn timeout(what: &str, after: Duration) -> DriverError {
    DriverError::Timeout {
        what: what.to_string(),
        after,
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        self.pending = Some(0);
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout_after: Duration) -> DriverResult<()> {
        if self.current.is_some() && self.current == self.hang_cards_on {
            std::future::pending::<()>().await;
        }

        let html = self.html()?;
        if select_first(&html, selector)?.is_some() {
            Ok(())
        } else {
            Err(timeout(selector, timeout_after))
        }
    }

    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<Element>> {
        let html = self.html()?;
        select_elements(&html, selector)
    }

    async fn is_visible(&mut self, selector: &str) -> DriverResult<bool> {
        let html = self.html()?;
        Ok(select_first(&html, selector)?.is_some_and(|el| el.is_visible()))
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> DriverResult<Option<String>> {
        let html = self.html()?;
        let element = select_first(&html, selector)?;
        Ok(element.and_then(|el| el.attr(name).map(str::to_string)))
    }

    async fn click(&mut self, selector: &str) -> DriverResult<()> {
        let html = self.html()?;
        let index = self.current.ok_or(DriverError::NoPage)?;
        self.log.lock().unwrap().clicks += 1;

        if let Some(error) = self
            .click_failures
            .get_mut(&index)
            .and_then(|queue| queue.pop_front())
        {
            return Err(error);
        }

        let element =
            select_first(&html, selector)?.ok_or_else(|| DriverError::NotFound(selector.to_string()))?;
        if !element.is_visible() {
            return Err(DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: "element is hidden".to_string(),
            });
        }

        // A click past the last page (a disabled control) never settles
        self.pending = Some(index + 1);
        Ok(())
    }

    async fn wait_for_idle(&mut self, timeout_after: Duration) -> DriverResult<()> {
        if let Some(error) = self.navigation_error.take() {
            self.pending = None;
            return Err(error);
        }

        match self.pending.take() {
            None => Ok(()),
            Some(index) if index < self.pages.len() => {
                self.current = Some(index);
                Ok(())
            }
            Some(_) => Err(timeout("network idle", timeout_after)),
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out one prepared scripted driver
pub struct ScriptedFactory {
    driver: Mutex<Option<ScriptedDriver>>,
}

impl ScriptedFactory {
    pub fn new(driver: ScriptedDriver) -> Self {
        Self {
            driver: Mutex::new(Some(driver)),
        }
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn open(&self) -> DriverResult<Box<dyn PageDriver>> {
        let driver = self.driver.lock().unwrap().take().ok_or(DriverError::Closed)?;
        Ok(Box::new(driver))
    }
}
