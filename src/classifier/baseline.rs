use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProbeKitError;
use crate::generator::RequestTemplate;
use crate::transport::{Transport, TransportResponse};
use super::predicate::SuccessPredicate;

/// When to send the neutral request before a scan.
///
/// `Auto` only captures a baseline when no keyword decides success, so
/// ordinary failure pages of different lengths are not reported as hits.
/// `Always` captures it regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
    Off,
    #[default]
    Auto,
    Always,
}

impl BaselineMode {
    pub fn captures_for(&self, predicate: &SuccessPredicate) -> bool {
        match self {
            Self::Off => false,
            Self::Auto => !predicate.has_keywords(),
            Self::Always => true,
        }
    }
}

impl std::str::FromStr for BaselineMode {
    type Err = ProbeKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" | "false" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            "always" | "on" | "true" => Ok(Self::Always),
            other => Err(ProbeKitError::Config(format!("Unknown baseline mode: {}", other))),
        }
    }
}

/// Reference response for the target under neutral input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub status: u16,
    /// Body length in characters.
    pub length: usize,
}

impl Baseline {
    pub fn from_response(response: &TransportResponse) -> Self {
        Self { status: response.status, length: response.text_len() }
    }

    /// Send the neutral request once, without retries.
    pub async fn capture(
        transport: &dyn Transport,
        template: &RequestTemplate,
        timeout: Duration,
    ) -> Result<Self, ProbeKitError> {
        let request = template.neutral_request();
        debug!(method = %request.method, url = %request.url, "Capturing baseline");

        let response = match tokio::time::timeout(timeout, transport.send(&request, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeKitError::Timeout(format!(
                "baseline request exceeded {}ms",
                timeout.as_millis()
            ))),
        };

        match response {
            Ok(response) => {
                let baseline = Self::from_response(&response);
                debug!(status = baseline.status, length = baseline.length, "Baseline captured");
                Ok(baseline)
            }
            Err(e) => {
                warn!(error = %e, "Baseline request failed, baseline detection disabled");
                Err(e)
            }
        }
    }
}
