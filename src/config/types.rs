use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ProbeKitError;
use crate::reporting::OutputFormat;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF_SECS: f64 = 1.0;
pub const DEFAULT_DELAY_SECS: f64 = 0.0;
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Optional YAML configuration. Every section and field may be omitted.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProbeKitConfig {
    pub engine: Option<EngineConfig>,
    pub http: Option<HttpConfig>,
    pub detection: Option<DetectionConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct EngineConfig {
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<f64>,
    pub retries: Option<u32>,
    pub backoff_secs: Option<f64>,
    pub delay_secs: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct HttpConfig {
    pub user_agent: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub max_redirects: Option<usize>,
    pub danger_accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct DetectionConfig {
    pub len_threshold_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub formats: Option<Vec<OutputFormat>>,
}

impl ProbeKitConfig {
    pub fn engine(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn detection(&self) -> DetectionConfig {
        self.detection.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }
}

/// Convert a user-supplied number of seconds, rejecting negative or non-finite values.
pub fn duration_from_secs(field: &str, secs: f64) -> Result<Duration, ProbeKitError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ProbeKitError::Config(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, secs
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ProbeKitError::Config(format!("{} of {} seconds is out of range: {}", field, secs, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = ProbeKitConfig::default();
        assert!(config.engine.is_none());
        assert_eq!(config.engine(), EngineConfig::default());
        assert!(config.output().formats.is_none());
    }

    #[test]
    fn test_output_formats_deserialize() {
        let output: OutputConfig = serde_yaml::from_str("formats: [json, csv]\ndirectory: out").unwrap();
        assert_eq!(output.formats, Some(vec![OutputFormat::Json, OutputFormat::Csv]));
        assert_eq!(output.directory.as_deref(), Some("out"));
    }

    #[test]
    fn test_duration_from_secs() {
        assert_eq!(duration_from_secs("timeout", 1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(duration_from_secs("delay", 0.0).unwrap(), Duration::ZERO);
        assert!(duration_from_secs("timeout", -1.0).is_err());
        assert!(duration_from_secs("timeout", f64::INFINITY).is_err());
    }

    #[test]
    fn test_huge_duration_is_config_error() {
        assert!(matches!(duration_from_secs("timeout", 1e30), Err(ProbeKitError::Config(_))));
    }
}
