//! Synthetic listing data
//!
//! Produces results shaped exactly like a live crawl so the rest of the
//! pipeline can run without touching the network.

use crate::state::{AccumulatedResult, Accumulator};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Fixed pool of names shuffled into each synthetic ranking
pub const MOCK_RESTAURANT_NAMES: [&str; 20] = [
    "Delicious Bites",
    "Tasty Corner",
    "Savory Dish",
    "Flavor Haven",
    "Culinary Delight",
    "Gourmet Express",
    "Fine Dining",
    "Spice Fusion",
    "Urban Taste",
    "Coastal Kitchen",
    "Downtown Diner",
    "Garden Grill",
    "Fresh Plate",
    "Sunset Cafe",
    "Terrace Table",
    "Street Food Spot",
    "Chef's Special",
    "Bistro Central",
    "Healthy Harvest",
    "Daily Feast",
];

/// Generates shuffled rankings of a fixed size
#[derive(Debug)]
pub struct MockSource {
    count: usize,
    rng: StdRng,
}

impl MockSource {
    /// Creates a source of `count` entities seeded from the OS
    pub fn new(count: usize) -> Self {
        Self {
            count,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible source
    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self {
            count,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Produces one ranking; every call reshuffles
    ///
    /// Counts beyond the name pool are filled with `Restaurant <k>`.
    pub fn generate(&mut self) -> AccumulatedResult {
        let mut pool = MOCK_RESTAURANT_NAMES.to_vec();
        pool.shuffle(&mut self.rng);

        let names = pool
            .into_iter()
            .map(str::to_string)
            .chain((MOCK_RESTAURANT_NAMES.len() + 1..).map(|k| format!("Restaurant {}", k)))
            .take(self.count);

        let mut accumulated = Accumulator::new();
        accumulated.extend_page(names);
        accumulated.finish(0, None)
    }
}
