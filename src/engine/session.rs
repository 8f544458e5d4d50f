use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::classifier::{classify, Baseline, BaselineMode, SuccessPredicate};
use crate::errors::{ProbeKitError, RetryPolicy};
use crate::generator::{CandidatePlan, RequestTemplate};
use crate::models::{Classification, ProbeFailure, ProbeOutcome, ScanReport, ScanStatus};
use crate::reporting::ResultSink;
use crate::transport::Transport;
use super::aggregator::Aggregator;
use super::dispatcher::Dispatcher;
use super::events::ScanEvent;
use super::executor::ProbeExecutor;

/// Engine knobs for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub concurrency: usize,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub delay_between: Duration,
    pub baseline: BaselineMode,
    pub predicate: SuccessPredicate,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            delay_between: Duration::ZERO,
            baseline: BaselineMode::Auto,
            predicate: SuccessPredicate::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ProbeKitError> {
        if self.concurrency == 0 {
            return Err(ProbeKitError::Config("Concurrency must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(ProbeKitError::Config("Timeout must be greater than zero".into()));
        }
        self.predicate.validate()
    }
}

/// One scan from candidate plan to persisted report.
pub struct ScanSession {
    scan_id: String,
    config: ScanConfig,
    transport: Arc<dyn Transport>,
    template: RequestTemplate,
    plan: CandidatePlan,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<ScanEvent>>,
    sink: Option<Box<dyn ResultSink>>,
}

impl ScanSession {
    pub fn new(
        config: ScanConfig,
        transport: Arc<dyn Transport>,
        template: RequestTemplate,
        plan: CandidatePlan,
    ) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            config,
            transport,
            template,
            plan,
            cancel_token: CancellationToken::new(),
            event_tx: None,
            sink: None,
        }
    }

    /// Share an external token so `.cancel()` on it stops submission.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<ScanEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    pub async fn run(self) -> Result<ScanReport, ProbeKitError> {
        self.config.validate()?;

        if !self.plan.config_errors.is_empty() {
            let messages: Vec<String> = self.plan.config_errors.iter().map(|e| e.to_string()).collect();
            error!(errors = messages.len(), "Candidate generation failed");
            return Err(ProbeKitError::Config(messages.join("; ")));
        }

        let target = self.template.target().to_string();
        let total = self.plan.set.len();

        if total == 0 {
            info!(scan_id = %self.scan_id, "No candidates to probe");
            let report = Aggregator::new(&self.scan_id, &target, 0).finish(ScanStatus::NothingToDo);
            self.emit(ScanEvent::ScanCompleted {
                status: report.status,
                counts: report.counts,
                duration_ms: report.duration_ms,
            });
            return Ok(report);
        }

        info!(
            scan_id = %self.scan_id,
            target = %target,
            total,
            concurrency = self.config.concurrency,
            "Starting scan"
        );
        self.emit(ScanEvent::ScanStarted {
            scan_id: self.scan_id.clone(),
            target: target.clone(),
            total,
            concurrency: self.config.concurrency,
        });

        let mut predicate = self.config.predicate.clone();
        if self.config.baseline.captures_for(&predicate) {
            match Baseline::capture(self.transport.as_ref(), &self.template, self.config.timeout).await {
                Ok(baseline) => {
                    predicate = predicate.with_baseline(&baseline);
                    self.emit(ScanEvent::BaselineCaptured {
                        status: baseline.status,
                        length: baseline.length,
                    });
                }
                Err(e) => self.emit(ScanEvent::BaselineFailed { error: e.to_string() }),
            }
        } else if self.config.baseline == BaselineMode::Auto {
            debug!("Keyword detection configured, skipping baseline");
        }
        info!(detection = %predicate.describe(), "Success detection");

        let mut aggregator = Aggregator::new(&self.scan_id, &target, total)
            .with_event_channel(self.event_tx.clone());

        let executor = Arc::new(ProbeExecutor::new(
            self.transport.clone(),
            Arc::new(self.template.clone()),
            self.config.timeout,
            self.config.retry,
        ));
        let predicate = Arc::new(predicate);

        let dispatcher = Dispatcher::new(self.config.concurrency)
            .with_delay(self.config.delay_between)
            .with_cancel_token(self.cancel_token.clone());

        let mut results = dispatcher.dispatch(self.plan.set.iter(), move |candidate| {
            let executor = executor.clone();
            let predicate = predicate.clone();
            async move {
                let outcome = executor.execute(candidate).await;
                let classification = classify(&predicate, &outcome);
                outcome.into_record(&classification)
            }
        });

        while let Some(record) = results.recv().await {
            aggregator.record(record);
        }

        // A panicked task drops its result; every submitted candidate still gets an outcome
        if !self.cancel_token.is_cancelled() && aggregator.counts().completed < total {
            let recorded: HashSet<usize> = aggregator.outcomes().iter().map(|r| r.index).collect();
            let lost: Vec<_> = self.plan.set.iter().filter(|c| !recorded.contains(&c.index)).collect();
            warn!(lost = lost.len(), "Probe tasks ended without reporting an outcome");
            for candidate in lost {
                let failure = ProbeFailure::from_error(&ProbeKitError::Internal(
                    "probe task aborted before reporting".into(),
                ));
                let classification = Classification::probe_error(failure.reason());
                let outcome = ProbeOutcome {
                    candidate,
                    url: None,
                    elapsed: Duration::ZERO,
                    attempts: 0,
                    result: Err(failure),
                };
                aggregator.record(outcome.into_record(&classification));
            }
        }

        let counts = aggregator.counts();
        let status = if counts.completed < counts.total && self.cancel_token.is_cancelled() {
            warn!(completed = counts.completed, total = counts.total, "Scan cancelled, results are partial");
            self.emit(ScanEvent::ScanCancelled { completed: counts.completed, total: counts.total });
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        };

        let mut report = aggregator.finish(status);

        if let Some(ref sink) = self.sink {
            match sink.persist(&report) {
                Ok(paths) => report.saved_to = paths,
                Err(e) => error!(error = %e, "Failed to persist results"),
            }
        }

        info!(
            scan_id = %report.scan_id,
            status = %report.status,
            completed = report.counts.completed,
            hits = report.counts.hits,
            errors = report.counts.errors,
            duration_ms = report.duration_ms,
            "Scan finished"
        );
        self.emit(ScanEvent::ScanCompleted {
            status: report.status,
            counts: report.counts,
            duration_ms: report.duration_ms,
        });

        Ok(report)
    }
}
