//! Statistics for poll cycles.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::list::Listing;

/// Statistics collected during one poll cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollStats {
    /// When the cycle started
    pub started_at: Option<DateTime<Utc>>,

    /// When the cycle completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Listing pages fetched
    pub pages: usize,

    /// Keys returned by the listing (before filtering)
    pub keys_listed: usize,

    /// Keys dropped by the filter pattern
    pub keys_filtered: usize,

    /// Keys retained as the new snapshot
    pub keys_retained: usize,

    pub adds: usize,

    pub deletes: usize,

    /// Events the sink refused
    pub emit_failures: usize,

    /// Errors encountered while emitting
    pub errors: Vec<String>,
}

impl PollStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the cycle as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record the pages and keys of a complete listing.
    pub fn record_listing(&mut self, listing: &Listing) {
        self.pages += listing.pages;
        self.keys_listed += listing.entries.len();
    }

    pub fn record_filtered(&mut self) {
        self.keys_filtered += 1;
    }

    /// Record an event the sink could not take.
    pub fn record_emit_failure(&mut self, error: impl ToString) {
        self.emit_failures += 1;
        self.errors.push(error.to_string());
    }

    /// Duration of the cycle.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Events emitted successfully.
    pub fn emitted(&self) -> usize {
        (self.adds + self.deletes).saturating_sub(self.emit_failures)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
