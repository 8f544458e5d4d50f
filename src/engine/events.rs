use crate::models::{OutcomeRecord, ScanCounts, ScanStatus};

/// Messages sent from a running scan to whoever is displaying it.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Candidates are about to be dispatched
    ScanStarted {
        scan_id: String,
        target: String,
        total: usize,
        concurrency: usize,
    },
    /// The neutral request answered
    BaselineCaptured {
        status: u16,
        length: usize,
    },
    /// The neutral request failed; baseline rules are off for this scan
    BaselineFailed {
        error: String,
    },
    /// One candidate finished, whatever its verdict
    OutcomeRecorded {
        record: OutcomeRecord,
        completed: usize,
        total: usize,
    },
    /// A candidate matched a success rule
    HitFound {
        record: OutcomeRecord,
    },
    /// Submission stopped early
    ScanCancelled {
        completed: usize,
        total: usize,
    },
    ScanCompleted {
        status: ScanStatus,
        counts: ScanCounts,
        duration_ms: u64,
    },
}
