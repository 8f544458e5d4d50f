use serde::{Deserialize, Serialize};

/// Final tag attached to every probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The response matched a success rule.
    Hit,
    /// The probe completed and nothing matched.
    Miss,
    /// The probe never produced a usable response.
    ProbeError,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::ProbeError => "probe_error",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an outcome received its verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    Keyword(String),
    Redirect,
    StatusChange { from: u16, to: u16 },
    LengthDelta(f64),
    Reflected,
    StatusAccepted(u16),
    /// Transient failures exhausted every attempt.
    RequestError,
    /// A permanent failure, tagged with its error type.
    Error(String),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(word) => write!(f, "keyword:{}", word),
            Self::Redirect => f.write_str("redirect"),
            Self::StatusChange { from, to } => write!(f, "status_change:{}->{}", from, to),
            Self::LengthDelta(pct) => write!(f, "len_diff:{:.1}%", pct),
            Self::Reflected => f.write_str("reflected"),
            Self::StatusAccepted(code) => write!(f, "status:{}", code),
            Self::RequestError => f.write_str("request_error"),
            Self::Error(kind) => write!(f, "error:{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    pub reason: Option<Reason>,
}

impl Classification {
    pub fn hit(reason: Reason) -> Self {
        Self { verdict: Verdict::Hit, reason: Some(reason) }
    }

    pub fn miss() -> Self {
        Self { verdict: Verdict::Miss, reason: None }
    }

    pub fn probe_error(reason: Reason) -> Self {
        Self { verdict: Verdict::ProbeError, reason: Some(reason) }
    }

    /// Reason rendered the way it appears in reports; empty for misses.
    pub fn reason_string(&self) -> String {
        self.reason.as_ref().map(|r| r.to_string()).unwrap_or_default()
    }
}
