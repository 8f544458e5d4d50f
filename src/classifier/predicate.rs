use serde::{Deserialize, Serialize};

use crate::errors::ProbeKitError;
use crate::models::{Candidate, Classification, ProbeOutcome, Reason};
use crate::transport::TransportResponse;
use super::baseline::Baseline;

pub const DEFAULT_LEN_THRESHOLD_PCT: f64 = 20.0;

/// Half-open status code range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRange {
    pub start: u16,
    pub end: u16,
}

impl StatusRange {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, status: u16) -> bool {
        self.start <= status && status < self.end
    }
}

/// Success rules evaluated against each completed response.
///
/// Rules run in a fixed order and the first match wins:
/// keyword, redirect, status change, length delta, payload reflection,
/// accepted status. A rule with no configuration is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessPredicate {
    /// Case-insensitive body markers; the first configured one found wins.
    pub keywords: Vec<String>,
    pub allow_redirect: bool,
    pub baseline_status: Option<u16>,
    pub baseline_len: Option<usize>,
    pub len_threshold_pct: f64,
    /// Hit when the candidate's payload comes back verbatim.
    pub reflect_payload: bool,
    pub accept_status: Option<StatusRange>,
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            allow_redirect: false,
            baseline_status: None,
            baseline_len: None,
            len_threshold_pct: DEFAULT_LEN_THRESHOLD_PCT,
            reflect_payload: false,
            accept_status: None,
        }
    }
}

impl SuccessPredicate {
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let trimmed = keyword.trim();
        if !trimmed.is_empty() {
            self.keywords.push(trimmed.to_string());
        }
        self
    }

    pub fn with_baseline(mut self, baseline: &Baseline) -> Self {
        self.baseline_status = Some(baseline.status);
        self.baseline_len = Some(baseline.length);
        self
    }

    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn validate(&self) -> Result<(), ProbeKitError> {
        if !self.len_threshold_pct.is_finite() || self.len_threshold_pct < 0.0 {
            return Err(ProbeKitError::Config(format!(
                "Length threshold must be a non-negative percentage, got {}",
                self.len_threshold_pct
            )));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ProbeKitError::Config("Success keywords must not be blank".into()));
        }
        if let Some(range) = self.accept_status {
            if range.start >= range.end {
                return Err(ProbeKitError::Config(format!(
                    "Accepted status range {}..{} is empty",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    /// Decide hit or miss for a response that arrived.
    pub fn evaluate(&self, candidate: &Candidate, response: &TransportResponse) -> Classification {
        // 1. Keyword
        if !self.keywords.is_empty() {
            let body = response.body.to_lowercase();
            for keyword in &self.keywords {
                if body.contains(&keyword.to_lowercase()) {
                    return Classification::hit(Reason::Keyword(keyword.clone()));
                }
            }
        }

        // 2. Redirect
        if self.allow_redirect && response.redirected {
            return Classification::hit(Reason::Redirect);
        }

        // 3. Status change from baseline
        if let Some(baseline_status) = self.baseline_status {
            if response.status != baseline_status {
                return Classification::hit(Reason::StatusChange {
                    from: baseline_status,
                    to: response.status,
                });
            }
        }

        // 4. Length delta from baseline; an empty baseline counts as length 1
        if let Some(baseline_len) = self.baseline_len {
            let current = response.text_len();
            let diff = current.abs_diff(baseline_len);
            let pct = (diff as f64 / baseline_len.max(1) as f64) * 100.0;
            if pct >= self.len_threshold_pct {
                return Classification::hit(Reason::LengthDelta(pct));
            }
        }

        // 5. Payload reflection
        if self.reflect_payload {
            if let Some(payload) = candidate.identity.payload() {
                if !payload.is_empty() && response.body.contains(payload) {
                    return Classification::hit(Reason::Reflected);
                }
            }
        }

        // 6. Accepted status
        if let Some(range) = self.accept_status {
            if range.contains(response.status) {
                return Classification::hit(Reason::StatusAccepted(response.status));
            }
        }

        Classification::miss()
    }

    /// Summary of the active rules for operator-facing output.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.keywords.is_empty() {
            let quoted: Vec<String> = self.keywords.iter().map(|k| format!("'{}'", k)).collect();
            parts.push(format!("keyword={}", quoted.join("|")));
        }
        if let Some(status) = self.baseline_status {
            parts.push(format!("baseline_status={}", status));
        }
        if let Some(len) = self.baseline_len {
            parts.push(format!("baseline_len={},len_threshold_pct={}%", len, self.len_threshold_pct));
        }
        if self.allow_redirect {
            parts.push("redirects considered success".to_string());
        }
        if self.reflect_payload {
            parts.push("payload reflection".to_string());
        }
        if let Some(range) = self.accept_status {
            parts.push(format!("status in {}..{}", range.start, range.end));
        }
        if parts.is_empty() {
            "no success heuristics (use a keyword or baseline detection)".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Classify an outcome. Failed probes bypass the rules entirely.
pub fn classify(predicate: &SuccessPredicate, outcome: &ProbeOutcome) -> Classification {
    match &outcome.result {
        Ok(response) => predicate.evaluate(&outcome.candidate, response),
        Err(failure) => Classification::probe_error(failure.reason()),
    }
}
