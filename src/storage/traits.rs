//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot archives and
//! associated error types.

use crate::storage::{DailySnapshot, WriteOutcome, WritePolicy};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot archive implementations
///
/// The archive holds at most one snapshot per UTC calendar day. Whether an
/// existing day may be replaced is decided per write by the caller.
pub trait SnapshotStore: Send + Sync {
    /// Persists `snapshot` under `date`
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome::Written)` - No snapshot existed for the day
    /// * `Ok(WriteOutcome::Overwritten)` - An existing snapshot was replaced
    /// * `Ok(WriteOutcome::AlreadyExists)` - Left untouched under `CreateIfAbsent`
    /// * `Err(StorageError::InvalidSnapshot)` - The snapshot breaks its invariants
    fn write(
        &self,
        date: NaiveDate,
        snapshot: &DailySnapshot,
        policy: WritePolicy,
    ) -> StorageResult<WriteOutcome>;

    /// Loads the snapshot for `date`, or `None` if the day has none
    fn read(&self, date: NaiveDate) -> StorageResult<Option<DailySnapshot>>;

    /// Returns whether a snapshot exists for `date`
    fn exists(&self, date: NaiveDate) -> bool;

    /// Returns every archived date, ascending
    fn list_dates(&self) -> StorageResult<Vec<NaiveDate>>;
}
