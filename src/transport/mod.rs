pub mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ProbeKitError;

pub use http::{HttpSettings, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ProbeKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            other => Err(ProbeKitError::Config(format!("Unsupported HTTP method: {}", other))),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully materialized request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Form fields sent as an urlencoded body. Only used for POST.
    pub form: Vec<(String, String)>,
}

impl ProbeRequest {
    pub fn get(url: Url) -> Self {
        Self { method: HttpMethod::Get, url, form: Vec::new() }
    }

    pub fn post(url: Url, form: Vec<(String, String)>) -> Self {
        Self { method: HttpMethod::Post, url, form }
    }
}

/// Normalized response handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    /// Whether the request went through at least one redirect.
    pub redirected: bool,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    pub final_url: String,
}

impl TransportResponse {
    /// Body length in characters, which is what length-delta detection compares.
    pub fn text_len(&self) -> usize {
        self.body.chars().count()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Network capability the engine probes through.
///
/// Implementations return `Network`/`Timeout` for connection-level failures
/// so the executor retries them; any other error is final.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, ProbeKitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!(matches!("PUT".parse::<HttpMethod>(), Err(ProbeKitError::Config(_))));
    }

    #[test]
    fn test_text_len_counts_chars() {
        let resp = TransportResponse {
            status: 200,
            body: "ñandú".to_string(),
            redirected: false,
            headers: BTreeMap::new(),
            final_url: String::new(),
        };
        assert_eq!(resp.text_len(), 5);
        assert_eq!(resp.body.len(), 7);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "nginx".to_string());
        let resp = TransportResponse {
            status: 200,
            body: String::new(),
            redirected: false,
            headers,
            final_url: String::new(),
        };
        assert_eq!(resp.header("Server"), Some("nginx"));
        assert_eq!(resp.header("content-type"), None);
    }
}
