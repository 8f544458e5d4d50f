use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::errors::{with_retry, ProbeKitError, RetryPolicy};
use crate::generator::RequestTemplate;
use crate::models::{Candidate, ProbeFailure, ProbeOutcome};
use crate::transport::Transport;

/// Turns one candidate into one outcome: materialize, send, retry transient failures.
pub struct ProbeExecutor {
    transport: Arc<dyn Transport>,
    template: Arc<RequestTemplate>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ProbeExecutor {
    pub fn new(
        transport: Arc<dyn Transport>,
        template: Arc<RequestTemplate>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self { transport, template, timeout, retry }
    }

    /// Never fails; every error ends up in the outcome.
    pub async fn execute(&self, candidate: Candidate) -> ProbeOutcome {
        let start = Instant::now();

        let request = match self.template.materialize(&candidate) {
            Ok(request) => request,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "Could not build request");
                return ProbeOutcome {
                    candidate,
                    url: None,
                    elapsed: start.elapsed(),
                    attempts: 0,
                    result: Err(ProbeFailure::from_error(&e)),
                };
            }
        };

        let label = candidate.to_string();
        let timeout = self.timeout;
        let transport = &self.transport;
        let request_ref = &request;

        let outcome = with_retry(&label, &self.retry, || async move {
            match tokio::time::timeout(timeout, transport.send(request_ref, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(ProbeKitError::Timeout(format!(
                    "no response within {}ms",
                    timeout.as_millis()
                ))),
            }
        })
        .await;

        trace!(
            candidate = %label,
            attempts = outcome.attempts,
            ok = outcome.result.is_ok(),
            "Probe finished"
        );

        ProbeOutcome {
            candidate,
            url: Some(request.url.to_string()),
            elapsed: start.elapsed(),
            attempts: outcome.attempts,
            result: outcome.result.map_err(|e| ProbeFailure::from_error(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateIdentity, FailureKind};
    use crate::transport::{ProbeRequest, TransportResponse};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use url::Url;

    struct Flaky {
        calls: AtomicU32,
        fail_first: u32,
        hang: bool,
    }

    #[async_trait]
    impl Transport for Flaky {
        async fn send(&self, request: &ProbeRequest, _timeout: Duration) -> Result<TransportResponse, ProbeKitError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if n < self.fail_first {
                return Err(ProbeKitError::Network("connection reset".into()));
            }
            Ok(TransportResponse {
                status: 200,
                body: "ok".into(),
                redirected: false,
                headers: BTreeMap::new(),
                final_url: request.url.to_string(),
            })
        }
    }

    fn executor(transport: Arc<Flaky>, retries: u32, timeout: Duration) -> ProbeExecutor {
        let template = RequestTemplate::Path { base: Url::parse("http://example.com/").unwrap() };
        ProbeExecutor::new(
            transport,
            Arc::new(template),
            timeout,
            RetryPolicy::new(retries, Duration::from_millis(1)),
        )
    }

    fn candidate() -> Candidate {
        Candidate::new(0, CandidateIdentity::Path { path: "admin".into() })
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let transport = Arc::new(Flaky { calls: AtomicU32::new(0), fail_first: 1, hang: false });
        let outcome = executor(transport.clone(), 2, Duration::from_secs(1)).execute(candidate()).await;
        assert_eq!(outcome.status(), Some(200));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.url.as_deref(), Some("http://example.com/admin"));
    }

    #[tokio::test]
    async fn test_transient_failure_exhausts_attempts() {
        let transport = Arc::new(Flaky { calls: AtomicU32::new(0), fail_first: u32::MAX, hang: false });
        let outcome = executor(transport.clone(), 2, Duration::from_secs(1)).execute(candidate()).await;
        assert_eq!(outcome.attempts, 3);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.failure().unwrap().kind, FailureKind::Transient);
    }

    #[tokio::test]
    async fn test_hung_transport_times_out() {
        let transport = Arc::new(Flaky { calls: AtomicU32::new(0), fail_first: 0, hang: true });
        let outcome = executor(transport, 1, Duration::from_millis(20)).execute(candidate()).await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.failure().unwrap().error_type, "TimeoutError");
    }

    #[tokio::test]
    async fn test_materialize_error_is_permanent() {
        let transport = Arc::new(Flaky { calls: AtomicU32::new(0), fail_first: 0, hang: false });
        let mismatched = Candidate::new(
            0,
            CandidateIdentity::Credential { username: "a".into(), password: "b".into() },
        );
        let outcome = executor(transport.clone(), 2, Duration::from_secs(1)).execute(mismatched).await;
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.url.is_none());
        assert_eq!(outcome.failure().unwrap().kind, FailureKind::Permanent);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
