use std::path::Path;

use crate::errors::ProbeKitError;
use super::schema::CONFIG_SCHEMA;
use super::types::{duration_from_secs, ProbeKitConfig};
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<ProbeKitConfig, ProbeKitError> {
    if !path.exists() {
        return Err(ProbeKitError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(ProbeKitError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

pub fn parse_config_str(content: &str) -> Result<ProbeKitConfig, ProbeKitError> {
    if content.trim().is_empty() {
        return Ok(ProbeKitConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: ProbeKitConfig = serde_yaml::from_value(yaml)?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), ProbeKitError> {
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| ProbeKitError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| ProbeKitError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only; typed parsing and semantic checks decide.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Reject values that parse but cannot drive a scan.
fn validate_semantics(config: &ProbeKitConfig) -> Result<(), ProbeKitError> {
    if let Some(engine) = &config.engine {
        if engine.concurrency == Some(0) {
            return Err(ProbeKitError::Config("engine.concurrency must be at least 1".into()));
        }
        if let Some(timeout) = engine.timeout_secs {
            if duration_from_secs("engine.timeout_secs", timeout)?.is_zero() {
                return Err(ProbeKitError::Config("engine.timeout_secs must be greater than zero".into()));
            }
        }
        if let Some(backoff) = engine.backoff_secs {
            duration_from_secs("engine.backoff_secs", backoff)?;
        }
        if let Some(delay) = engine.delay_secs {
            duration_from_secs("engine.delay_secs", delay)?;
        }
    }

    if let Some(threshold) = config.detection.as_ref().and_then(|d| d.len_threshold_pct) {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ProbeKitError::Config(format!(
                "detection.len_threshold_pct must be a non-negative percentage, got {}",
                threshold
            )));
        }
    }

    if let Some(formats) = config.output.as_ref().and_then(|o| o.formats.as_ref()) {
        if formats.is_empty() {
            return Err(ProbeKitError::Config("output.formats must list at least one format".into()));
        }
    }

    Ok(())
}
