//! Statistics generation from the snapshot archive
//!
//! This module provides functionality for summarizing the archived daily
//! rankings and comparing the two most recent days.

use crate::storage::{DailySnapshot, SnapshotStore};
use crate::ClimbError;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Movement of one entity between the two latest snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    pub name: String,
    /// Position on the earlier day, `None` for a new entry
    pub previous: Option<u32>,
    pub current: u32,
}

impl RankChange {
    /// Positive when the entity climbed
    pub fn delta(&self) -> Option<i64> {
        self.previous
            .map(|previous| i64::from(previous) - i64::from(self.current))
    }
}

/// Archive statistics summary
#[derive(Debug, Clone, Default)]
pub struct ArchiveStatistics {
    /// Number of archived days
    pub total_days: usize,

    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,

    /// Restaurant count on the latest day
    pub latest_total: usize,

    /// Mean restaurant count per day
    pub average_total: f64,

    /// Distinct non-empty names seen across the archive
    pub distinct_names: usize,

    /// Latest-day entities compared with the day before, in current order
    pub rank_changes: Vec<RankChange>,

    /// Names present the day before but missing from the latest day
    pub dropped: Vec<String>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The snapshot archive to scan
///
/// # Returns
///
/// * `Ok(ArchiveStatistics)` - Successfully loaded statistics
/// * `Err(ClimbError)` - A snapshot could not be read
pub fn load_statistics(store: &dyn SnapshotStore) -> Result<ArchiveStatistics, ClimbError> {
    let dates = store.list_dates()?;

    let mut snapshots = Vec::with_capacity(dates.len());
    for date in &dates {
        if let Some(snapshot) = store.read(*date)? {
            snapshots.push(snapshot);
        }
    }

    let mut stats = ArchiveStatistics {
        total_days: snapshots.len(),
        first_date: dates.first().copied(),
        last_date: dates.last().copied(),
        ..Default::default()
    };

    if snapshots.is_empty() {
        return Ok(stats);
    }

    let totals: usize = snapshots.iter().map(|s| s.total_restaurants).sum();
    stats.average_total = totals as f64 / snapshots.len() as f64;

    stats.distinct_names = snapshots
        .iter()
        .flat_map(|s| s.restaurants.iter())
        .filter(|r| !r.name.is_empty())
        .map(|r| r.name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let latest = &snapshots[snapshots.len() - 1];
    stats.latest_total = latest.total_restaurants;

    if snapshots.len() >= 2 {
        let previous = &snapshots[snapshots.len() - 2];
        let (changes, dropped) = compare(previous, latest);
        stats.rank_changes = changes;
        stats.dropped = dropped;
    }

    Ok(stats)
}

/// Compares two snapshots by name; unnamed entries are skipped
fn compare(previous: &DailySnapshot, latest: &DailySnapshot) -> (Vec<RankChange>, Vec<String>) {
    let before: HashMap<&str, u32> = previous
        .restaurants
        .iter()
        .filter(|r| !r.name.is_empty())
        .map(|r| (r.name.as_str(), r.position))
        .collect();

    let changes: Vec<RankChange> = latest
        .restaurants
        .iter()
        .filter(|r| !r.name.is_empty())
        .map(|r| RankChange {
            name: r.name.clone(),
            previous: before.get(r.name.as_str()).copied(),
            current: r.position,
        })
        .collect();

    let now: HashSet<&str> = changes.iter().map(|c| c.name.as_str()).collect();
    let dropped = previous
        .restaurants
        .iter()
        .filter(|r| !r.name.is_empty() && !now.contains(r.name.as_str()))
        .map(|r| r.name.clone())
        .collect();

    (changes, dropped)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ArchiveStatistics) {
    println!("=== Archive Statistics ===\n");

    let (Some(first), Some(last)) = (stats.first_date, stats.last_date) else {
        println!("No snapshots archived yet.");
        return;
    };

    println!("Overview:");
    println!("  Days archived: {}", stats.total_days);
    println!("  Range: {} to {}", first, last);
    println!("  Restaurants on latest day: {}", stats.latest_total);
    println!("  Average per day: {:.1}", stats.average_total);
    println!("  Distinct names seen: {}", stats.distinct_names);
    println!();

    if stats.rank_changes.is_empty() {
        return;
    }

    println!("Movement since previous day:");
    for change in &stats.rank_changes {
        let movement = match change.delta() {
            None => "new".to_string(),
            Some(0) => "=".to_string(),
            Some(d) if d > 0 => format!("+{}", d),
            Some(d) => d.to_string(),
        };
        println!("  {:>3}. {} ({})", change.current, change.name, movement);
    }

    if !stats.dropped.is_empty() {
        println!("\nDropped off ({}):", stats.dropped.len());
        for name in &stats.dropped {
            println!("  - {}", name);
        }
    }
}
