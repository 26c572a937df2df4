//! Loop termination reasons for a crawl run
//!
//! Every way the pagination loop can end after a successful initial
//! navigation is represented here. None of them is fatal: the run still
//! returns whatever was accumulated.

use std::fmt;

/// Classification of a failed pagination step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The next affordance vanished or refused the interaction; the listing is done
    Exhausted,

    /// The remote side refused us (HTTP 403/429 or similar)
    Blocked,

    /// Timeout or network hiccup; retrying may help
    Transient,
}

impl FailureKind {
    /// Returns the snake_case name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::Blocked => "blocked",
            Self::Transient => "transient",
        }
    }

    /// Returns true if the controller may retry after this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed `advance()` with its classification and the driver's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl PaginationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PaginationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.message)
    }
}

/// Represents why the crawl loop stopped collecting pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    // ===== Natural Ends =====
    /// The configured page ceiling was reached
    PageCeiling,

    /// No visible next affordance on the last page
    NoNextPage,

    /// No result card appeared before the card timeout
    NoDataFound,

    // ===== Absorbed Failures =====
    /// The next affordance was present but advancing failed
    PaginationFailed(PaginationFailure),

    // ===== External =====
    /// The run was cancelled from outside
    Cancelled,
}

impl StopReason {
    /// Returns true if the listing ended on its own terms
    ///
    /// An exhausted pagination failure counts as natural: the affordance was
    /// there but led nowhere, which is how the end of a listing usually looks.
    pub fn is_natural_end(&self) -> bool {
        match self {
            Self::PageCeiling | Self::NoNextPage | Self::NoDataFound => true,
            Self::PaginationFailed(failure) => failure.kind == FailureKind::Exhausted,
            Self::Cancelled => false,
        }
    }

    /// Returns true if a failure cut the crawl short
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PaginationFailed(f) if f.kind != FailureKind::Exhausted)
    }

    /// Returns the snake_case name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageCeiling => "page_ceiling",
            Self::NoNextPage => "no_next_page",
            Self::NoDataFound => "no_data_found",
            Self::PaginationFailed(_) => "pagination_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaginationFailed(failure) => write!(f, "pagination_failed: {}", failure),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
