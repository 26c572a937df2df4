//! JSON file snapshot archive
//!
//! One pretty-printed file per day: `<data-dir>/YYYY-MM-DD.json`.

use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::{DailySnapshot, WriteOutcome, WritePolicy};
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Snapshot archive stored as JSON files in one directory
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    data_dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Creates a store rooted at `data_dir`
    ///
    /// The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", date.format(DATE_FORMAT)))
    }

    fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::io(&self.data_dir, e))
    }

    /// Writes through a sibling temp file so readers never see a partial file
    fn replace(&self, path: &Path, body: &[u8]) -> StorageResult<()> {
        let tmp = sibling(path, "swap");

        fs::write(&tmp, body).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StorageError::io(path, e)
        })
    }

    /// Creates `path` exclusively; `Ok(false)` if it already exists
    ///
    /// The body is written to a sibling temp file and hard-linked into
    /// place, so a failed write never leaves a partial file under `path`.
    fn create_new(&self, path: &Path, body: &[u8]) -> StorageResult<bool> {
        let tmp = sibling(path, "new");

        let staged = fs::write(&tmp, body)
            .and_then(|_| fs::File::open(&tmp)?.sync_all())
            .map_err(|e| StorageError::io(&tmp, e));
        if let Err(e) = staged {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        let linked = fs::hard_link(&tmp, path);
        let _ = fs::remove_file(&tmp);

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

/// Hidden temp path next to `path`
fn sibling(path: &Path, tag: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", file_name, tag))
}

impl SnapshotStore for JsonSnapshotStore {
    fn write(
        &self,
        date: NaiveDate,
        snapshot: &DailySnapshot,
        policy: WritePolicy,
    ) -> StorageResult<WriteOutcome> {
        snapshot.validate()?;
        self.ensure_dir()?;

        let path = self.path_for(date);
        let body = serde_json::to_vec_pretty(snapshot)?;

        let outcome = match policy {
            WritePolicy::Overwrite => {
                let existed = path.exists();
                self.replace(&path, &body)?;
                if existed {
                    WriteOutcome::Overwritten
                } else {
                    WriteOutcome::Written
                }
            }
            WritePolicy::CreateIfAbsent => {
                if self.create_new(&path, &body)? {
                    WriteOutcome::Written
                } else {
                    WriteOutcome::AlreadyExists
                }
            }
        };

        match outcome {
            WriteOutcome::AlreadyExists => {
                tracing::info!("Data for {} already exists, skipping.", date.format(DATE_FORMAT))
            }
            _ => tracing::info!(
                "Saved {} restaurants to {}",
                snapshot.total_restaurants,
                path.display()
            ),
        }

        Ok(outcome)
    }

    fn read(&self, date: NaiveDate) -> StorageResult<Option<DailySnapshot>> {
        let path = self.path_for(date);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        let snapshot: DailySnapshot =
            serde_json::from_slice(&raw).map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    fn exists(&self, date: NaiveDate) -> bool {
        self.path_for(date).is_file()
    }

    fn list_dates(&self) -> StorageResult<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.data_dir, e)),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.data_dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT) {
                dates.push(date);
            }
        }

        dates.sort();
        Ok(dates)
    }
}
