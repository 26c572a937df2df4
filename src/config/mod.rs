//! Configuration module for Climbwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use climbwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("climbwatch.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DriverConfig, MockConfig, ModeSetting, NextCheck, OutputConfig,
    PacingConfig, SourceConfig, SourceMode,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
