use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::models::Candidate;

/// Runs probes over a candidate stream with at most `concurrency` in flight.
///
/// Results arrive on the returned channel in completion order. The channel
/// closes once submission has stopped and every in-flight probe has drained.
/// Cancelling the token stops submission only; running probes finish.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    concurrency: usize,
    delay_between: Duration,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            delay_between: Duration::ZERO,
            cancel: CancellationToken::new(),
        }
    }

    /// Minimum spacing between successive submissions.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between = delay;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn dispatch<I, F, Fut, T>(&self, candidates: I, probe: F) -> mpsc::UnboundedReceiver<T>
    where
        I: IntoIterator<Item = Candidate>,
        I::IntoIter: Send + 'static,
        F: Fn(Candidate) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let delay = self.delay_between;
        let cancel = self.cancel.clone();
        let candidates = candidates.into_iter();

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();
            let mut submitted = 0usize;

            for candidate in candidates {
                if cancel.is_cancelled() {
                    break;
                }

                if submitted > 0 && !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }

                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    permit = semaphore.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let fut = probe(candidate);
                let tx = tx.clone();
                tasks.spawn(async move {
                    let result = fut.await;
                    drop(permit);
                    let _ = tx.send(result);
                });
                submitted += 1;

                while let Some(joined) = tasks.try_join_next() {
                    if let Err(e) = joined {
                        error!(error = %e, "Probe task failed");
                    }
                }
            }

            debug!(submitted, cancelled = cancel.is_cancelled(), "Submission finished, draining");
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Probe task failed");
                }
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateIdentity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn paths(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(i, CandidateIdentity::Path { path: format!("p{}", i) }))
            .collect()
    }

    async fn collect<T>(mut rx: mpsc::UnboundedReceiver<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = rx.recv().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn test_every_candidate_yields_one_result() {
        let dispatcher = Dispatcher::new(4);
        let rx = dispatcher.dispatch(paths(25), |c| async move { c.index });
        let mut seen = collect(rx).await;
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        let dispatcher = Dispatcher::new(2);
        let rx = dispatcher.dispatch(paths(2), |c| async move {
            if c.index == 0 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            c.index
        });
        assert_eq!(collect(rx).await, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_concurrency() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(3);

        let (a, p) = (active.clone(), peak.clone());
        let rx = dispatcher.dispatch(paths(20), move |_| {
            let (active, peak) = (a.clone(), p.clone());
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        });

        assert_eq!(collect(rx).await.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_clamped_to_one() {
        assert_eq!(Dispatcher::new(0).concurrency(), 1);
    }

    #[tokio::test]
    async fn test_delay_spaces_submissions() {
        let dispatcher = Dispatcher::new(10).with_delay(Duration::from_millis(20));
        let start = Instant::now();
        let rx = dispatcher.dispatch(paths(4), |_| async {});
        assert_eq!(collect(rx).await.len(), 4);
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_cancel_before_dispatch_submits_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let dispatcher = Dispatcher::new(2).with_cancel_token(token);
        let rx = dispatcher.dispatch(paths(10), |c| async move { c.index });
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_lets_in_flight_finish() {
        let token = CancellationToken::new();
        let dispatcher = Dispatcher::new(2).with_cancel_token(token.clone());
        let started = Arc::new(AtomicUsize::new(0));

        let s = started.clone();
        let t = token.clone();
        let rx = dispatcher.dispatch(paths(100), move |c| {
            let started = s.clone();
            let token = t.clone();
            async move {
                if started.fetch_add(1, Ordering::SeqCst) == 3 {
                    token.cancel();
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
                c.index
            }
        });

        let results = collect(rx).await;
        assert_eq!(results.len(), started.load(Ordering::SeqCst));
        assert!(results.len() < 100);
    }
}
