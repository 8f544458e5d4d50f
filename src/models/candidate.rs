use serde::{Deserialize, Serialize};

/// The axis values that produced a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateIdentity {
    Credential { username: String, password: String },
    Path { path: String },
    Parameter { name: String },
    Payload { parameter: String, payload: String },
}

impl CandidateIdentity {
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Credential { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Self::Credential { password, .. } => Some(password),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Path { path } => Some(path),
            _ => None,
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Parameter { name } => Some(name),
            Self::Payload { parameter, .. } => Some(parameter),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Payload { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credential { username, password } => write!(f, "{}:{}", username, password),
            Self::Path { path } => write!(f, "/{}", path.trim_start_matches('/')),
            Self::Parameter { name } => f.write_str(name),
            Self::Payload { parameter, payload } => write!(f, "{}={}", parameter, payload),
        }
    }
}

/// One unit of probe work. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Position in generation order, stable across restarts of the same set.
    pub index: usize,
    pub identity: CandidateIdentity,
}

impl Candidate {
    pub fn new(index: usize, identity: CandidateIdentity) -> Self {
        Self { index, identity }
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.identity.fmt(f)
    }
}
