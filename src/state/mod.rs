//! State module for tracking crawl progress
//!
//! This module holds the values a crawl run produces as it goes.
//!
//! # Components
//!
//! - `Accumulator`: Owns the ordered entity list and assigns global positions
//! - `AccumulatedResult`: The finished list handed to the snapshot writer
//! - `StopReason`: Why the pagination loop ended

mod accumulator;
mod stop_reason;

// Re-export main types
pub use accumulator::{AccumulatedResult, Accumulator, Restaurant};
pub use stop_reason::{FailureKind, PaginationFailure, StopReason};
