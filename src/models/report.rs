use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::OutcomeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Every candidate produced an outcome.
    Completed,
    /// Submission stopped early; outcomes are partial.
    Cancelled,
    /// The candidate set was empty, no probe was sent.
    NothingToDo,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::NothingToDo => write!(f, "nothing to do"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounts {
    pub total: usize,
    pub completed: usize,
    pub hits: usize,
    pub errors: usize,
}

impl ScanCounts {
    pub fn misses(&self) -> usize {
        self.completed - self.hits - self.errors
    }
}

/// Final product of a scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub target: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub counts: ScanCounts,
    /// Every outcome in completion order, misses and errors included.
    pub outcomes: Vec<OutcomeRecord>,
    /// Files written by the persistence sink, if any.
    #[serde(default)]
    pub saved_to: Vec<PathBuf>,
}

impl ScanReport {
    pub fn hits(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.outcomes.iter().filter(|o| o.is_hit())
    }

    pub fn errors(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.outcomes.iter().filter(|o| o.is_error())
    }

    pub fn is_partial(&self) -> bool {
        self.counts.completed < self.counts.total
    }
}
