//! Storage module for the snapshot archive
//!
//! This module handles persisting daily snapshots, including:
//! - The snapshot record and its invariants
//! - Write policies for live runs and history backfill
//! - A JSON file archive keyed by UTC date

mod json;
mod traits;

pub use json::JsonSnapshotStore;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use crate::state::{AccumulatedResult, Restaurant};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One day's persisted ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// Instant the snapshot was produced
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,

    pub total_restaurants: usize,

    /// Entities ordered by position
    pub restaurants: Vec<Restaurant>,
}

impl DailySnapshot {
    /// Builds a snapshot from a run result taken at `timestamp`
    ///
    /// Run diagnostics (pages visited, stop reason) are dropped and the
    /// timestamp is cut to the millisecond precision it is stored with.
    pub fn new(result: AccumulatedResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            total_restaurants: result.restaurants.len(),
            restaurants: result.restaurants,
        }
    }

    /// Builds a snapshot stamped with the current time
    ///
    /// Call once the result is complete; the stamp is the completion instant.
    pub fn from_result(result: AccumulatedResult) -> Self {
        Self::new(result, Utc::now())
    }

    /// UTC calendar day the snapshot belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Checks that the count matches and positions are exactly `1..=total`
    pub fn validate(&self) -> StorageResult<()> {
        if self.total_restaurants != self.restaurants.len() {
            return Err(StorageError::InvalidSnapshot(format!(
                "total_restaurants is {} but {} restaurants are listed",
                self.total_restaurants,
                self.restaurants.len()
            )));
        }

        for (index, restaurant) in self.restaurants.iter().enumerate() {
            let expected = index as u32 + 1;
            if restaurant.position != expected {
                return Err(StorageError::InvalidSnapshot(format!(
                    "entry {} has position {}, expected {}",
                    index, restaurant.position, expected
                )));
            }
        }

        Ok(())
    }
}

/// How a write treats an existing snapshot for the same day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Replace whatever is there (live run for today)
    Overwrite,
    /// Only fill a missing day (history backfill)
    CreateIfAbsent,
}

/// What a write actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Overwritten,
    AlreadyExists,
}

impl WriteOutcome {
    /// Returns true if the file on disk now holds the new snapshot
    pub fn persisted(&self) -> bool {
        !matches!(self, Self::AlreadyExists)
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` timestamps
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
