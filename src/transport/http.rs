//! reqwest-backed transport with redirect tracking

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{redirect::Policy, Client, StatusCode};
use tokio::time::Instant;
use tracing::trace;
use url::Url;

use crate::errors::ProbeKitError;
use super::{HttpMethod, ProbeRequest, Transport, TransportResponse};

pub const DEFAULT_USER_AGENT: &str = concat!("probekit/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
    pub max_redirects: usize,
    pub danger_accept_invalid_certs: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            danger_accept_invalid_certs: false,
        }
    }
}

pub struct HttpTransport {
    client: Client,
    max_redirects: usize,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self, ProbeKitError> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &settings.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ProbeKitError::Config(format!("Invalid header name '{}': {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProbeKitError::Config(format!("Invalid value for header '{}': {}", key, e)))?;
            default_headers.insert(name, value);
        }

        // Redirects are followed by hand so same-URL hops still count
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(default_headers)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(settings.danger_accept_invalid_certs)
            .build()
            .map_err(|e| ProbeKitError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, max_redirects: settings.max_redirects })
    }
}

/// Resolve the `Location` of a followable redirect against the current URL.
fn redirect_target(current: &Url, status: StatusCode, headers: &HeaderMap) -> Option<Url> {
    if !matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308) {
        return None;
    }
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, ProbeKitError> {
        let deadline = Instant::now() + timeout;
        let mut method = request.method;
        let mut url = request.url.clone();
        let mut form: &[(String, String)] = &request.form;
        let mut chain: Vec<Url> = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ProbeKitError::Timeout(format!(
                    "{} did not settle within {:?} after {} redirect(s)",
                    request.url,
                    timeout,
                    chain.len()
                )));
            }

            let builder = match method {
                HttpMethod::Get => self.client.get(url.clone()),
                HttpMethod::Post => self.client.post(url.clone()).form(form),
            };
            let response = builder.timeout(remaining).send().await.map_err(map_reqwest_error)?;
            let status = response.status();

            if let Some(next) = redirect_target(&url, status, response.headers()) {
                if chain.len() >= self.max_redirects {
                    return Err(ProbeKitError::Network(format!(
                        "{} exceeded {} redirects",
                        request.url, self.max_redirects
                    )));
                }
                trace!(from = %url, to = %next, status = status.as_u16(), "Following redirect");
                // 307/308 replay the original method and body
                if !matches!(status.as_u16(), 307 | 308) {
                    method = HttpMethod::Get;
                    form = &[];
                }
                chain.push(std::mem::replace(&mut url, next));
                continue;
            }

            let mut headers = BTreeMap::new();
            for (k, v) in response.headers().iter() {
                headers.insert(k.as_str().to_ascii_lowercase(), v.to_str().unwrap_or("").to_string());
            }

            let status = status.as_u16();
            let redirected = !chain.is_empty();
            let body = response.text().await.map_err(map_reqwest_error)?;
            trace!(
                url = %request.url,
                status,
                hops = chain.len(),
                len = body.len(),
                "Response received"
            );

            return Ok(TransportResponse {
                status,
                body,
                redirected,
                headers,
                final_url: url.to_string(),
            });
        }
    }
}

/// Sort reqwest failures into the transient/permanent split the executor relies on.
fn map_reqwest_error(e: reqwest::Error) -> ProbeKitError {
    if e.is_timeout() {
        ProbeKitError::Timeout(e.to_string())
    } else if e.is_builder() || e.is_decode() {
        ProbeKitError::ResponseProcessing(e.to_string())
    } else {
        // connect, request and body errors
        ProbeKitError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = HttpSettings::default();
        assert!(settings.user_agent.starts_with("probekit/"));
        assert_eq!(settings.max_redirects, 10);
        assert!(!settings.danger_accept_invalid_certs);
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let mut settings = HttpSettings::default();
        settings.headers.insert("bad header".into(), "x".into());
        assert!(matches!(HttpTransport::new(&settings), Err(ProbeKitError::Config(_))));
    }

    #[test]
    fn test_custom_headers_accepted() {
        let mut settings = HttpSettings::default();
        settings.headers.insert("X-Scan".into(), "probekit".into());
        assert!(HttpTransport::new(&settings).is_ok());
    }

    #[test]
    fn test_redirect_target_resolves_relative_location() {
        let current = Url::parse("http://example.com/login").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/login?failed=1"));
        let next = redirect_target(&current, StatusCode::SEE_OTHER, &headers).unwrap();
        assert_eq!(next.as_str(), "http://example.com/login?failed=1");
    }

    #[test]
    fn test_redirect_target_same_url_still_followed() {
        let current = Url::parse("http://example.com/login").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/login"));
        assert_eq!(redirect_target(&current, StatusCode::FOUND, &headers), Some(current.clone()));
    }

    #[test]
    fn test_redirect_target_ignores_non_redirects() {
        let current = Url::parse("http://example.com/").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/elsewhere"));
        assert_eq!(redirect_target(&current, StatusCode::OK, &headers), None);
        assert_eq!(redirect_target(&current, StatusCode::NOT_MODIFIED, &headers), None);
        assert_eq!(redirect_target(&current, StatusCode::FOUND, &HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = HttpTransport::new(&HttpSettings::default()).unwrap();
        let url = url::Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let err = transport
            .send(&ProbeRequest::get(url), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {err:?}");
    }
}
