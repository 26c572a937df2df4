//! HTML element queries
//!
//! This module turns rendered HTML into detached [`Element`] values:
//! - Selector parsing with driver-level errors
//! - Element lookup in document order
//! - Sub-element text extraction
//! - Visibility checks from attributes

use crate::crawler::driver::{DriverError, DriverResult};
use scraper::{ElementRef, Html, Selector};

/// A detached copy of one matched element
///
/// Elements own their outer HTML, so they stay valid after the page they came
/// from has been replaced and can cross await points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    html: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Builds an element from its outer HTML
    ///
    /// Attributes are read from the first element in the fragment.
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let fragment = Html::parse_fragment(&html);
        let attributes = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .map(collect_attributes)
            .unwrap_or_default();

        Self { html, attributes }
    }

    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
            attributes: collect_attributes(element),
        }
    }

    /// Returns the outer HTML of the element
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Returns an attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the trimmed text of the first descendant matching `selector`
    ///
    /// `None` means no such descendant exists (or the selector is invalid);
    /// an existing but blank descendant yields `Some("")`.
    pub fn text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let fragment = Html::parse_fragment(&self.html);
        let found = fragment
            .select(&selector)
            .next()
            .map(|node| node.text().collect::<String>().trim().to_string());
        found
    }

    /// Returns false for elements hidden via `hidden`, `aria-hidden` or inline style
    pub fn is_visible(&self) -> bool {
        if self.attr("hidden").is_some() {
            return false;
        }

        if self
            .attr("aria-hidden")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return false;
        }

        if let Some(style) = self.attr("style") {
            let compact: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            if compact.contains("display:none") || compact.contains("visibility:hidden") {
                return false;
            }
        }

        true
    }
}

fn collect_attributes(element: ElementRef<'_>) -> Vec<(String, String)> {
    element
        .value()
        .attrs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Parses a CSS selector, mapping failures to [`DriverError::InvalidSelector`]
pub fn parse_selector(selector: &str) -> DriverResult<Selector> {
    Selector::parse(selector).map_err(|_| DriverError::InvalidSelector(selector.to_string()))
}

/// Returns every element in `html` matching `selector`, in document order
///
/// # Example
///
/// ```
/// use climbwatch::crawler::select_elements;
///
/// let html = r#"<div class="SearchResult"><h3> Carbone </h3></div>"#;
/// let cards = select_elements(html, ".SearchResult").unwrap();
/// assert_eq!(cards[0].text("h3"), Some("Carbone".to_string()));
/// ```
pub fn select_elements(html: &str, selector: &str) -> DriverResult<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let elements = document.select(&selector).map(Element::from_ref).collect();
    Ok(elements)
}

/// Returns the first element in `html` matching `selector`
pub fn select_first(html: &str, selector: &str) -> DriverResult<Option<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let first = document.select(&selector).next().map(Element::from_ref);
    Ok(first)
}
