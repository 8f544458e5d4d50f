use std::future::Future;
use std::time::Duration;

use super::types::ProbeKitError;
use tracing::debug;

/// Linear retry policy for a single probe.
///
/// `retries` counts the attempts made after the first one. The wait after the
/// n-th failed attempt is `backoff * n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self { retries, backoff }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay to wait after `failed_attempt` (1-based) before the next try.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        self.backoff.saturating_mul(failed_attempt)
    }
}

/// Result of a retried operation along with how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, ProbeKitError>,
    pub attempts: u32,
}

/// Execute an async operation with retry logic.
///
/// Retries only if the error is classified as retryable and attempts remain.
/// The last error is returned unchanged once attempts are exhausted.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut factory: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProbeKitError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match factory().await {
            Ok(value) => {
                return RetryOutcome { result: Ok(value), attempts: attempt };
            }
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable {
                    debug!(
                        operation = operation_name,
                        error_type = classification.error_type,
                        error = %e,
                        "Non-retryable error, failing immediately"
                    );
                    return RetryOutcome { result: Err(e), attempts: attempt };
                }

                if attempt >= max_attempts {
                    debug!(
                        operation = operation_name,
                        attempt,
                        max = max_attempts,
                        error = %e,
                        "Max retries exhausted"
                    );
                    return RetryOutcome { result: Err(e), attempts: attempt };
                }

                let delay = policy.delay_for(attempt);
                debug!(
                    operation = operation_name,
                    attempt,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after transient error"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
