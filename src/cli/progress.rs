use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::ScanEvent;
use crate::models::{ScanCounts, ScanStatus};
use crate::utils::formatting::format_rate;
use crate::utils::{format_duration, truncate_preview};

/// Renders scan events as an indicatif progress bar plus hit lines.
pub struct ScanProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
    hits: usize,
    errors: usize,
    start_time: Instant,
}

impl ScanProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: None,
            quiet,
            hits: 0,
            errors: 0,
            start_time: Instant::now(),
        }
    }

    /// Handle a scan event and update the bar accordingly.
    pub fn handle_event(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::ScanStarted { target, total, concurrency, .. } => {
                let bar = if self.quiet {
                    ProgressBar::hidden()
                } else {
                    ProgressBar::new(*total as u64)
                };
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  {spinner:.cyan} {bar:30.cyan/dark_gray} {pos}/{len} [{elapsed}] {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█▓░"),
                );
                bar.enable_steady_tick(Duration::from_millis(120));
                self.bar = Some(bar);
                self.say(&format!(
                    "{} {} ({} candidates, concurrency {})",
                    style("Scanning").cyan().bold(),
                    target,
                    total,
                    concurrency
                ));
                self.update_message();
            }
            ScanEvent::BaselineCaptured { status, length } => {
                self.say(&format!(
                    "  {} status {} length {}",
                    style("Baseline:").dim(),
                    status,
                    length
                ));
            }
            ScanEvent::BaselineFailed { error } => {
                self.say(&format!(
                    "  {} baseline request failed, continuing without it: {}",
                    style("⚠").yellow(),
                    truncate_preview(error)
                ));
            }
            ScanEvent::OutcomeRecorded { record, .. } => {
                if record.is_error() {
                    self.errors += 1;
                }
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                self.update_message();
            }
            ScanEvent::HitFound { record } => {
                self.hits += 1;
                // Hits are printed even in quiet mode.
                self.say_always(&format!("{} {}", style("[HIT]").green().bold(), record.describe()));
            }
            ScanEvent::ScanCancelled { completed, total } => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon_with_message(format!("cancelled after {}/{}", completed, total));
                }
            }
            ScanEvent::ScanCompleted { status, counts, duration_ms } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                if *status != ScanStatus::NothingToDo {
                    self.say(&completion_line(counts, *duration_ms));
                }
            }
        }
    }

    fn update_message(&self) {
        if let Some(bar) = &self.bar {
            let elapsed = self.start_time.elapsed().as_millis() as u64;
            bar.set_message(format!(
                "{} hits | {} errors | {}",
                self.hits,
                self.errors,
                format_rate(bar.position() as usize, elapsed)
            ));
        }
    }

    fn say(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.say_always(msg);
    }

    /// Print a line above the bar (won't interfere with redraws).
    fn say_always(&self, msg: &str) {
        match &self.bar {
            Some(bar) if !bar.is_hidden() => bar.println(msg),
            _ => println!("{}", msg),
        }
    }
}

fn completion_line(counts: &ScanCounts, duration_ms: u64) -> String {
    format!(
        "Finished {}/{} probes in {} ({} hits, {} errors)",
        counts.completed,
        counts.total,
        format_duration(duration_ms),
        counts.hits,
        counts.errors
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutcomeRecord, Verdict};

    fn record(verdict: Verdict) -> OutcomeRecord {
        OutcomeRecord {
            index: 0,
            username: Some("admin".into()),
            password: Some("123".into()),
            path: None,
            parameter: None,
            payload: None,
            url: None,
            status: Some(302),
            verdict,
            reason: "redirect".into(),
            response_length: Some(0),
            server: None,
            content_type: None,
            elapsed_ms: 1,
            attempts: 1,
            error: None,
        }
    }

    #[test]
    fn test_counts_hits_and_errors() {
        let mut progress = ScanProgress::new(true);
        progress.handle_event(&ScanEvent::ScanStarted {
            scan_id: "s".into(),
            target: "http://example.com".into(),
            total: 3,
            concurrency: 2,
        });
        progress.handle_event(&ScanEvent::HitFound { record: record(Verdict::Hit) });
        progress.handle_event(&ScanEvent::OutcomeRecorded { record: record(Verdict::Hit), completed: 1, total: 3 });
        progress.handle_event(&ScanEvent::OutcomeRecorded {
            record: record(Verdict::ProbeError),
            completed: 2,
            total: 3,
        });
        assert_eq!(progress.hits, 1);
        assert_eq!(progress.errors, 1);
        assert_eq!(progress.bar.as_ref().map(|b| b.position()), Some(2));

        progress.handle_event(&ScanEvent::ScanCompleted {
            status: ScanStatus::Completed,
            counts: ScanCounts { total: 3, completed: 3, hits: 1, errors: 1 },
            duration_ms: 10,
        });
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_completion_line() {
        let counts = ScanCounts { total: 4, completed: 4, hits: 1, errors: 0 };
        assert_eq!(completion_line(&counts, 2500), "Finished 4/4 probes in 2.5s (1 hits, 0 errors)");
    }
}
