use std::path::Path;

use crate::errors::ProbeKitError;
use tracing::{debug, warn};

/// One ordered input dimension of a scan (usernames, paths, payloads...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<String>,
}

impl Axis {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Keep only the first `cap` entries. `None` keeps everything.
    pub fn capped(mut self, cap: Option<usize>) -> Self {
        if let Some(cap) = cap {
            self.values.truncate(cap);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An axis loaded from disk plus the error that emptied it, if any.
#[derive(Debug)]
pub struct LoadedAxis {
    pub axis: Axis,
    pub error: Option<ProbeKitError>,
}

/// CLI-style limit where 0 means "no cap".
pub fn cap_from_limit(limit: usize) -> Option<usize> {
    if limit == 0 { None } else { Some(limit) }
}

/// One entry per non-blank line, trimmed, in file order.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn load_wordlist(path: &Path, cap: Option<usize>) -> Result<Vec<String>, ProbeKitError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ProbeKitError::Config(format!("Wordlist not found: {}", path.display())));
    }
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        ProbeKitError::Config(format!("Error reading wordlist {}: {}", path.display(), e))
    })?;

    let mut entries = parse_wordlist(&content);
    if let Some(cap) = cap {
        entries.truncate(cap);
    }
    debug!(path = %path.display(), entries = entries.len(), "Wordlist loaded");
    Ok(entries)
}

/// Load a wordlist without failing: a bad file yields an empty axis and the error.
pub async fn load_axis_soft(name: &str, path: &Path, cap: Option<usize>) -> LoadedAxis {
    match load_wordlist(path, cap).await {
        Ok(values) => LoadedAxis {
            axis: Axis::new(name, values),
            error: None,
        },
        Err(e) => {
            warn!(axis = name, error = %e, "Wordlist unavailable, axis left empty");
            LoadedAxis {
                axis: Axis::empty(name),
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_wordlist_skips_blank_lines() {
        let parsed = parse_wordlist("admin\n\n  root  \n\t\nguest\r\n");
        assert_eq!(parsed, vec!["admin", "root", "guest"]);
    }

    #[test]
    fn test_cap_from_limit() {
        assert_eq!(cap_from_limit(0), None);
        assert_eq!(cap_from_limit(5), Some(5));
    }

    #[test]
    fn test_axis_capped() {
        let axis = Axis::new("users", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(axis.clone().capped(Some(2)).values, vec!["a", "b"]);
        assert_eq!(axis.clone().capped(Some(10)).len(), 3);
        assert_eq!(axis.capped(None).len(), 3);
    }

    #[tokio::test]
    async fn test_load_wordlist_with_cap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "one\ntwo\nthree\nfour").unwrap();
        let entries = load_wordlist(file.path(), Some(2)).await.unwrap();
        assert_eq!(entries, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_load_missing_wordlist_is_config_error() {
        let result = load_wordlist(Path::new("/nonexistent/probekit/words.txt"), None).await;
        assert!(matches!(result, Err(ProbeKitError::Config(_))));
    }

    #[tokio::test]
    async fn test_soft_load_yields_empty_axis_on_failure() {
        let loaded = load_axis_soft("passwords", Path::new("/nonexistent/pass.txt"), None).await;
        assert!(loaded.axis.is_empty());
        assert_eq!(loaded.axis.name, "passwords");
        assert!(matches!(loaded.error, Some(ProbeKitError::Config(_))));
    }

    #[tokio::test]
    async fn test_soft_load_success() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "admin\nroot").unwrap();
        let loaded = load_axis_soft("users", file.path(), None).await;
        assert!(loaded.error.is_none());
        assert_eq!(loaded.axis.values, vec!["admin", "root"]);
    }
}
