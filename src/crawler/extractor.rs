//! Page extraction
//!
//! Turns the result cards on the current page into a sequence of names.

use crate::crawler::driver::PageDriver;
use crate::crawler::parser::Element;

/// Reads entity names out of result cards
#[derive(Debug, Clone)]
pub struct PageExtractor {
    card_selector: String,
    name_selector: String,
}

impl PageExtractor {
    pub fn new(card_selector: impl Into<String>, name_selector: impl Into<String>) -> Self {
        Self {
            card_selector: card_selector.into(),
            name_selector: name_selector.into(),
        }
    }

    /// Returns the names of every card on the current page, in page order
    ///
    /// Extraction never fails: a driver error while querying is logged and
    /// treated as a page with no cards, and a card without a readable name
    /// yields an empty name.
    pub async fn extract(&self, driver: &mut dyn PageDriver) -> ExtractedNames {
        let cards = match driver.query_all(&self.card_selector).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!("Failed to query '{}': {}", self.card_selector, e);
                Vec::new()
            }
        };

        ExtractedNames {
            cards: cards.into_iter(),
            name_selector: self.name_selector.clone(),
            index: 0,
        }
    }
}

/// Extracts names with one-off selectors
pub async fn extract_names(
    driver: &mut dyn PageDriver,
    card_selector: &str,
    name_selector: &str,
) -> ExtractedNames {
    PageExtractor::new(card_selector, name_selector)
        .extract(driver)
        .await
}

/// Lazy, single-pass sequence of names from one page
///
/// Each card's name is read only when the iterator reaches it.
#[derive(Debug)]
pub struct ExtractedNames {
    cards: std::vec::IntoIter<Element>,
    name_selector: String,
    index: usize,
}

impl Iterator for ExtractedNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let card = self.cards.next()?;
        self.index += 1;

        match card.text(&self.name_selector) {
            Some(name) => Some(name),
            None => {
                tracing::debug!(
                    "ExtractionAnomaly: card {} has no '{}'; using an empty name",
                    self.index,
                    self.name_selector
                );
                Some(String::new())
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cards.size_hint()
    }
}

impl ExactSizeIterator for ExtractedNames {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::{ScriptedDriver, ScriptedPage};

    fn extractor() -> PageExtractor {
        PageExtractor::new(".SearchResult", "h3")
    }

    #[tokio::test]
    async fn test_extracts_names_in_order() {
        let mut driver = ScriptedDriver::loaded(vec![ScriptedPage::named(&["Lilia", "Via Carota"])]);
        let names: Vec<String> = extractor().extract(&mut driver).await.collect();
        assert_eq!(names, vec!["Lilia", "Via Carota"]);
    }

    #[tokio::test]
    async fn test_malformed_card_yields_empty_name() {
        let page = ScriptedPage::new(vec![Some("Lilia".into()), None, Some("Rezdôra".into())]);
        let mut driver = ScriptedDriver::loaded(vec![page]);

        let names: Vec<String> = extractor().extract(&mut driver).await.collect();
        assert_eq!(names, vec!["Lilia", "", "Rezdôra"]);
    }

    #[tokio::test]
    async fn test_no_cards_is_empty_sequence() {
        let mut driver = ScriptedDriver::loaded(vec![ScriptedPage::named(&[])]);
        let mut names = extractor().extract(&mut driver).await;
        assert_eq!(names.len(), 0);
        assert!(names.next().is_none());
    }

    #[tokio::test]
    async fn test_extract_names_is_lazy_and_single_pass() {
        let mut driver = ScriptedDriver::loaded(vec![ScriptedPage::named(&["Lilia", "Misi", "Laser Wolf"])]);
        let mut names = extract_names(&mut driver, ".SearchResult", "h3").await;

        assert_eq!(names.next().as_deref(), Some("Lilia"));
        let rest: Vec<String> = names.by_ref().collect();
        assert_eq!(rest, vec!["Misi", "Laser Wolf"]);
        assert!(names.next().is_none());
    }

    #[tokio::test]
    async fn test_driver_error_is_empty_sequence() {
        // No page loaded: the query fails with NoPage
        let mut driver = ScriptedDriver::new(vec![ScriptedPage::named(&["Lilia"])]);
        let names: Vec<String> = extractor().extract(&mut driver).await.collect();
        assert!(names.is_empty());
    }
}
