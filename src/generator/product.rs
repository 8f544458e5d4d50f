use std::sync::Arc;

use crate::errors::ProbeKitError;
use crate::models::{Candidate, CandidateIdentity};
use super::wordlist::{Axis, LoadedAxis};

/// How a tuple of axis values turns into a candidate identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateShape {
    /// usernames × passwords
    Credential,
    /// paths
    Path,
    /// parameter names
    Parameter,
    /// parameters × payloads
    Payload,
}

impl CandidateShape {
    pub fn arity(&self) -> usize {
        match self {
            Self::Credential | Self::Payload => 2,
            Self::Path | Self::Parameter => 1,
        }
    }

    fn identity(&self, values: &[&str]) -> CandidateIdentity {
        match self {
            Self::Credential => CandidateIdentity::Credential {
                username: values[0].to_string(),
                password: values[1].to_string(),
            },
            Self::Path => CandidateIdentity::Path { path: values[0].to_string() },
            Self::Parameter => CandidateIdentity::Parameter { name: values[0].to_string() },
            Self::Payload => CandidateIdentity::Payload {
                parameter: values[0].to_string(),
                payload: values[1].to_string(),
            },
        }
    }
}

/// Cartesian product of the axes, in axis order with the last axis varying fastest.
///
/// The set itself holds no cursor, so `iter()` can be called any number of
/// times and always replays the same sequence.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    shape: CandidateShape,
    axes: Arc<[Axis]>,
}

impl CandidateSet {
    pub fn new(shape: CandidateShape, axes: Vec<Axis>) -> Result<Self, ProbeKitError> {
        if axes.len() != shape.arity() {
            return Err(ProbeKitError::Config(format!(
                "{:?} candidates need {} axes, got {}",
                shape,
                shape.arity(),
                axes.len()
            )));
        }
        Ok(Self { shape, axes: axes.into() })
    }

    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().fold(1usize, |acc, a| acc.saturating_mul(a.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> CandidateIter {
        CandidateIter {
            shape: self.shape,
            axes: self.axes.clone(),
            cursor: vec![0; self.axes.len()],
            next_index: 0,
            total: self.len(),
        }
    }
}

impl IntoIterator for &CandidateSet {
    type Item = Candidate;
    type IntoIter = CandidateIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy odometer over a `CandidateSet`. Owns its axes, so it can move into a task.
#[derive(Debug, Clone)]
pub struct CandidateIter {
    shape: CandidateShape,
    axes: Arc<[Axis]>,
    cursor: Vec<usize>,
    next_index: usize,
    total: usize,
}

impl Iterator for CandidateIter {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.total {
            return None;
        }

        let values: Vec<&str> = self
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &i)| axis.values[i].as_str())
            .collect();
        let candidate = Candidate::new(self.next_index, self.shape.identity(&values));

        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.axes[pos].len() {
                break;
            }
            self.cursor[pos] = 0;
        }
        self.next_index += 1;

        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidateIter {}

/// Candidate set plus any configuration errors hit while loading its axes.
#[derive(Debug)]
pub struct CandidatePlan {
    pub set: CandidateSet,
    pub config_errors: Vec<ProbeKitError>,
}

impl CandidatePlan {
    pub fn new(set: CandidateSet) -> Self {
        Self { set, config_errors: Vec::new() }
    }

    pub fn from_loaded(shape: CandidateShape, loaded: Vec<LoadedAxis>) -> Result<Self, ProbeKitError> {
        let mut axes = Vec::with_capacity(loaded.len());
        let mut config_errors = Vec::new();
        for l in loaded {
            if let Some(e) = l.error {
                config_errors.push(e);
            }
            axes.push(l.axis);
        }
        Ok(Self {
            set: CandidateSet::new(shape, axes)?,
            config_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(name: &str, values: &[&str]) -> Axis {
        Axis::new(name, values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_credential_product_order() {
        let set = CandidateSet::new(
            CandidateShape::Credential,
            vec![axis("users", &["admin", "root"]), axis("passwords", &["123", "pass", "x"])],
        )
        .unwrap();
        let labels: Vec<String> = set.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            vec!["admin:123", "admin:pass", "admin:x", "root:123", "root:pass", "root:x"]
        );
        let indices: Vec<usize> = set.iter().map(|c| c.index).collect();
        assert_eq!(indices, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_len_matches_product() {
        let set = CandidateSet::new(
            CandidateShape::Payload,
            vec![axis("params", &["id", "q"]), axis("payloads", &["'", "\"", "--"])],
        )
        .unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.iter().count(), 6);
        assert_eq!(set.iter().len(), 6);
    }

    #[test]
    fn test_caps_bound_product_before_expansion() {
        let users = axis("users", &["a", "b", "c", "d"]).capped(Some(2));
        let passwords = axis("passwords", &["1", "2", "3"]).capped(Some(1));
        let set = CandidateSet::new(CandidateShape::Credential, vec![users, passwords]).unwrap();
        let labels: Vec<String> = set.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, vec!["a:1", "b:1"]);
    }

    #[test]
    fn test_empty_axis_yields_nothing() {
        let set = CandidateSet::new(
            CandidateShape::Credential,
            vec![axis("users", &["admin"]), Axis::empty("passwords")],
        )
        .unwrap();
        assert!(set.is_empty());
        assert_eq!(set.iter().next(), None);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let set = CandidateSet::new(CandidateShape::Path, vec![axis("paths", &["admin", "login"])]).unwrap();
        let first: Vec<Candidate> = set.iter().collect();
        let second: Vec<Candidate> = (&set).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let result = CandidateSet::new(CandidateShape::Path, vec![axis("a", &["x"]), axis("b", &["y"])]);
        assert!(matches!(result, Err(ProbeKitError::Config(_))));
    }

    #[test]
    fn test_plan_collects_loader_errors() {
        let loaded = vec![
            LoadedAxis { axis: axis("users", &["admin"]), error: None },
            LoadedAxis {
                axis: Axis::empty("passwords"),
                error: Some(ProbeKitError::Config("Wordlist not found: pass.txt".into())),
            },
        ];
        let plan = CandidatePlan::from_loaded(CandidateShape::Credential, loaded).unwrap();
        assert_eq!(plan.config_errors.len(), 1);
        assert!(plan.set.is_empty());
    }
}
