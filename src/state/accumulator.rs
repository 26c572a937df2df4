use crate::state::StopReason;
use serde::{Deserialize, Serialize};

/// One ranked entity in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Display name; empty when the card had no readable name
    #[serde(default)]
    pub name: String,

    /// 1-based global rank in discovery order
    pub position: u32,
}

/// Ordered entity list built during one crawl run
///
/// The accumulator is the only place positions are assigned, so every list
/// it produces is the contiguous run `1..=len` with no gaps or repeats.
#[derive(Debug, Default)]
pub struct Accumulator {
    restaurants: Vec<Restaurant>,
}

impl Accumulator {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one page worth of names, continuing the global numbering
    ///
    /// # Returns
    ///
    /// The number of entities added from this page
    pub fn extend_page<I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.restaurants.len();
        for name in names {
            let position = self.restaurants.len() as u32 + 1;
            self.restaurants.push(Restaurant { name, position });
        }
        self.restaurants.len() - before
    }

    /// Returns the number of entities collected so far
    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    /// Returns whether nothing has been collected yet
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Consumes the accumulator and produces the final result
    pub fn finish(self, pages_visited: u32, stop_reason: Option<StopReason>) -> AccumulatedResult {
        AccumulatedResult {
            total_restaurants: self.restaurants.len(),
            restaurants: self.restaurants,
            pages_visited,
            stop_reason,
        }
    }
}

/// The in-memory result of one crawl run or mock generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatedResult {
    /// Entities ordered by position
    pub restaurants: Vec<Restaurant>,

    /// Always equal to `restaurants.len()`
    pub total_restaurants: usize,

    /// Number of listing pages that were extracted
    pub pages_visited: u32,

    /// Why the crawl loop ended; `None` for synthetic results
    pub stop_reason: Option<StopReason>,
}

impl AccumulatedResult {
    /// Returns whether the result holds no entities
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}
