//! Daily snapshot pipeline
//!
//! One run: pick the source for the resolved mode, produce today's ranking,
//! write it, and in mock mode fill in missing history.

use crate::config::{Config, SourceMode};
use crate::source::{build_producer, MockSource, SnapshotProducer};
use crate::state::StopReason;
use crate::storage::{DailySnapshot, JsonSnapshotStore, SnapshotStore, WriteOutcome, WritePolicy};
use crate::ClimbError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

/// What one run produced and persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: SourceMode,
    /// Instant the ranking was completed
    pub timestamp: DateTime<Utc>,
    /// Day the snapshot was filed under
    pub date: NaiveDate,
    pub outcome: WriteOutcome,
    pub total_restaurants: usize,
    pub pages_visited: u32,
    pub stop_reason: Option<StopReason>,
    /// History days created by the mock backfill
    pub backfilled: usize,
}

/// Runs the full pipeline against the configured data directory
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `mode` - Source resolved at startup
/// * `cancel` - Cancels the crawl; whatever was collected is still written
pub async fn run(
    config: &Config,
    mode: SourceMode,
    cancel: &CancellationToken,
) -> Result<RunReport, ClimbError> {
    let store = JsonSnapshotStore::new(&config.output.data_dir);
    let mut producer = build_producer(config, mode)?;

    tracing::info!("Using {} source", producer.name());

    let mut report = publish(producer.as_mut(), &store, mode, cancel).await?;

    if mode == SourceMode::Mock {
        let mut history = MockSource::new(config.mock.count as usize);
        report.backfilled = backfill_history(
            &mut history,
            &store,
            report.timestamp,
            config.mock.history_days,
        )?;
    }

    Ok(report)
}

/// Produces one ranking and files it under the UTC date it was completed,
/// replacing any snapshot already there
pub async fn publish(
    producer: &mut dyn SnapshotProducer,
    store: &dyn SnapshotStore,
    mode: SourceMode,
    cancel: &CancellationToken,
) -> Result<RunReport, ClimbError> {
    let result = producer.produce(cancel).await?;

    if result.is_empty() {
        tracing::warn!("No restaurants collected; writing an empty snapshot");
    }

    let pages_visited = result.pages_visited;
    let stop_reason = result.stop_reason.clone();
    let snapshot = DailySnapshot::from_result(result);
    let date = snapshot.date();

    let outcome = store.write(date, &snapshot, WritePolicy::Overwrite)?;

    Ok(RunReport {
        mode,
        timestamp: snapshot.timestamp,
        date,
        outcome,
        total_restaurants: snapshot.total_restaurants,
        pages_visited,
        stop_reason,
        backfilled: 0,
    })
}

/// Writes synthetic snapshots for the `days` days before `now`
///
/// Days that already have a snapshot are left alone.
///
/// # Returns
///
/// The number of days actually created
pub fn backfill_history(
    mock: &mut MockSource,
    store: &dyn SnapshotStore,
    now: DateTime<Utc>,
    days: u32,
) -> Result<usize, ClimbError> {
    let mut created = 0;

    for k in 1..=i64::from(days) {
        let timestamp = now - Duration::days(k);
        let snapshot = DailySnapshot::new(mock.generate(), timestamp);

        if store.write(snapshot.date(), &snapshot, WritePolicy::CreateIfAbsent)?
            == WriteOutcome::Written
        {
            tracing::info!("Generated historic data for {}", snapshot.date());
            created += 1;
        }
    }

    Ok(created)
}
