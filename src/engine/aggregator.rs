use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use crate::models::{OutcomeRecord, ScanCounts, ScanReport, ScanStatus};
use super::events::ScanEvent;

/// Single-writer collector of outcome records in completion order.
pub struct Aggregator {
    scan_id: String,
    target: String,
    started_at: DateTime<Utc>,
    start: Instant,
    counts: ScanCounts,
    outcomes: Vec<OutcomeRecord>,
    event_tx: Option<mpsc::UnboundedSender<ScanEvent>>,
}

impl Aggregator {
    pub fn new(scan_id: impl Into<String>, target: impl Into<String>, total: usize) -> Self {
        Self {
            scan_id: scan_id.into(),
            target: target.into(),
            started_at: Utc::now(),
            start: Instant::now(),
            counts: ScanCounts { total, ..ScanCounts::default() },
            outcomes: Vec::with_capacity(total.min(4096)),
            event_tx: None,
        }
    }

    pub fn with_event_channel(mut self, tx: Option<mpsc::UnboundedSender<ScanEvent>>) -> Self {
        self.event_tx = tx;
        self
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    pub fn record(&mut self, record: OutcomeRecord) {
        self.counts.completed += 1;
        if record.is_hit() {
            self.counts.hits += 1;
            info!(candidate = %record.label(), reason = %record.reason, status = ?record.status, "Hit");
            self.emit(ScanEvent::HitFound { record: record.clone() });
        } else if record.is_error() {
            self.counts.errors += 1;
        }

        self.emit(ScanEvent::OutcomeRecorded {
            record: record.clone(),
            completed: self.counts.completed,
            total: self.counts.total,
        });
        self.outcomes.push(record);
    }

    pub fn counts(&self) -> ScanCounts {
        self.counts
    }

    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    pub fn finish(self, status: ScanStatus) -> ScanReport {
        ScanReport {
            scan_id: self.scan_id,
            target: self.target,
            status,
            started_at: self.started_at,
            duration_ms: self.start.elapsed().as_millis() as u64,
            counts: self.counts,
            outcomes: self.outcomes,
            saved_to: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;

    fn record(index: usize, verdict: Verdict) -> OutcomeRecord {
        OutcomeRecord {
            index,
            username: None,
            password: None,
            path: Some(format!("p{}", index)),
            parameter: None,
            payload: None,
            url: None,
            status: Some(200),
            verdict,
            reason: String::new(),
            response_length: Some(0),
            server: None,
            content_type: None,
            elapsed_ms: 1,
            attempts: 1,
            error: None,
        }
    }

    #[test]
    fn test_counts_and_order() {
        let mut agg = Aggregator::new("scan", "http://example.com", 3);
        agg.record(record(2, Verdict::Hit));
        agg.record(record(0, Verdict::Miss));
        agg.record(record(1, Verdict::ProbeError));

        let report = agg.finish(ScanStatus::Completed);
        assert_eq!(report.counts, ScanCounts { total: 3, completed: 3, hits: 1, errors: 1 });
        assert_eq!(report.counts.misses(), 1);
        let order: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert!(!report.is_partial());
    }

    #[test]
    fn test_hit_emits_two_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut agg = Aggregator::new("scan", "t", 2).with_event_channel(Some(tx));
        agg.record(record(0, Verdict::Hit));
        agg.record(record(1, Verdict::Miss));

        assert!(matches!(rx.try_recv(), Ok(ScanEvent::HitFound { .. })));
        assert!(matches!(rx.try_recv(), Ok(ScanEvent::OutcomeRecorded { completed: 1, .. })));
        assert!(matches!(rx.try_recv(), Ok(ScanEvent::OutcomeRecorded { completed: 2, total: 2, .. })));
        assert!(rx.try_recv().is_err());
    }
}
