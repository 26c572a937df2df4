//! Climbwatch: a daily ranked-listing snapshotter
//!
//! This crate walks a paginated restaurant listing with a page driver,
//! records every entity in discovery order, and archives one immutable JSON
//! snapshot per UTC calendar day.

pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Climbwatch operations
///
/// Only these conditions terminate a run. Recoverable crawl conditions
/// (empty pages, failed pagination, existing backfill files) are reported as
/// values instead; see [`state::StopReason`] and [`storage::WriteOutcome`].
#[derive(Debug, Error)]
pub enum ClimbError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Page driver error: {0}")]
    Driver(#[from] crawler::DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Run cancelled before the listing finished loading")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Climbwatch operations
pub type Result<T> = std::result::Result<T, ClimbError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SourceMode};
pub use crawler::{CrawlController, PageDriver};
pub use state::{AccumulatedResult, Restaurant, StopReason};
pub use storage::{DailySnapshot, JsonSnapshotStore, SnapshotStore, WriteOutcome, WritePolicy};
