use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ProbeKitError;
use crate::transport::TransportResponse;
use super::candidate::Candidate;
use super::verdict::{Classification, Reason, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection-level failure that survived every retry.
    Transient,
    /// Failure that was never retried.
    Permanent,
}

/// Terminal error descriptor for a probe that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub error_type: String,
    pub message: String,
}

impl ProbeFailure {
    pub fn from_error(err: &ProbeKitError) -> Self {
        let classification = err.classify();
        Self {
            kind: if classification.retryable {
                FailureKind::Transient
            } else {
                FailureKind::Permanent
            },
            error_type: classification.error_type.to_string(),
            message: err.to_string(),
        }
    }

    pub fn reason(&self) -> Reason {
        match self.kind {
            FailureKind::Transient => Reason::RequestError,
            FailureKind::Permanent => Reason::Error(self.error_type.clone()),
        }
    }
}

/// Result of executing one candidate, produced exactly once per candidate.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub candidate: Candidate,
    /// Materialized request URL, absent if materialization itself failed.
    pub url: Option<String>,
    pub elapsed: Duration,
    pub attempts: u32,
    pub result: Result<TransportResponse, ProbeFailure>,
}

impl ProbeOutcome {
    pub fn status(&self) -> Option<u16> {
        self.result.as_ref().ok().map(|r| r.status)
    }

    pub fn response(&self) -> Option<&TransportResponse> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        self.result.as_ref().err()
    }

    /// Flatten into a persisted record, dropping the response body.
    pub fn into_record(self, classification: &Classification) -> OutcomeRecord {
        let identity = &self.candidate.identity;
        let (status, response_length, error) = match &self.result {
            Ok(response) => (Some(response.status), Some(response.text_len()), None),
            Err(failure) => (None, None, Some(failure.message.clone())),
        };
        let header = |name: &str| {
            self.response().and_then(|r| r.header(name)).map(str::to_string)
        };

        OutcomeRecord {
            index: self.candidate.index,
            username: identity.username().map(str::to_string),
            password: identity.password().map(str::to_string),
            path: identity.path().map(str::to_string),
            parameter: identity.parameter().map(str::to_string),
            payload: identity.payload().map(str::to_string),
            url: self.url.clone(),
            status,
            verdict: classification.verdict,
            reason: classification.reason_string(),
            response_length,
            server: header("server"),
            content_type: header("content-type"),
            elapsed_ms: self.elapsed.as_millis() as u64,
            attempts: self.attempts,
            error,
        }
    }
}

/// Flat, fixed-shape record handed to persistence sinks.
///
/// Every field exists for every outcome; inapplicable ones are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub index: usize,
    pub username: Option<String>,
    pub password: Option<String>,
    pub path: Option<String>,
    pub parameter: Option<String>,
    pub payload: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub verdict: Verdict,
    pub reason: String,
    pub response_length: Option<usize>,
    pub server: Option<String>,
    pub content_type: Option<String>,
    pub elapsed_ms: u64,
    pub attempts: u32,
    pub error: Option<String>,
}

impl OutcomeRecord {
    pub fn is_hit(&self) -> bool {
        self.verdict == Verdict::Hit
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::ProbeError
    }

    /// Candidate identity as a short label, e.g. `admin:123` or `id=1'`.
    pub fn label(&self) -> String {
        match (&self.username, &self.password, &self.path, &self.parameter, &self.payload) {
            (Some(u), Some(p), _, _, _) => format!("{}:{}", u, p),
            (_, _, Some(path), _, _) => format!("/{}", path.trim_start_matches('/')),
            (_, _, _, Some(param), Some(payload)) => format!("{}={}", param, payload),
            (_, _, _, Some(param), None) => param.clone(),
            _ => format!("#{}", self.index),
        }
    }

    /// Human-readable one-liner for progress displays.
    pub fn describe(&self) -> String {
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "---".to_string());
        if self.reason.is_empty() {
            format!("{} -> {} [{}]", self.label(), status, self.verdict)
        } else {
            format!("{} -> {} [{}: {}]", self.label(), status, self.verdict, self.reason)
        }
    }
}
