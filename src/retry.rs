//! Bounded retry loop with linear backoff.
//!
//! A failed attempt is retried only while the attempt budget lasts and the
//! failure is classified as retryable. The delay before retry `n` (1-based)
//! is `base_delay * n`. The terminal failure is returned unchanged.

use std::error::Error as StdError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::ErrorClassifier;

/// Attempt budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `N` means at most `N + 1` calls.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_base_ms),
        )
    }
}

/// Run `op` until it succeeds, the budget runs out, or `retryable` rejects
/// the failure.
///
/// The backoff sleep is a plain tokio sleep, so dropping the returned future
/// cancels a pending wait.
pub async fn with_retry<T, E, Op, Fut, P>(
    policy: &RetryPolicy,
    mut retryable: P,
    mut op: Op,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: Display,
{
    let mut attempts: u32 = 0;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempts >= policy.max_retries || !retryable(&err) {
            if attempts > 0 {
                tracing::warn!(attempts = attempts + 1, error = %err, "Giving up after retries");
            }
            return Err(err);
        }

        attempts += 1;
        let delay = policy.delay_for(attempts);
        tracing::debug!(
            attempt = attempts,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Retrying after failure"
        );
        tokio::time::sleep(delay).await;
    }
}

/// [`with_retry`] retrying only failures the classifier marks as network
/// errors.
pub async fn with_classified_retry<T, E, Op, Fut>(
    policy: &RetryPolicy,
    classifier: &ErrorClassifier,
    op: Op,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: StdError + 'static,
{
    with_retry(policy, |err: &E| classifier.is_retryable(err), op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::RemoteResponse;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn refused() -> FetchError {
        FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_retryable_runs_n_plus_one_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let classifier = ErrorClassifier::new();
        let policy = RetryPolicy::new(3, Duration::from_millis(100));

        let started = Instant::now();
        let result: Result<(), FetchError> = with_classified_retry(&policy, &classifier, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(refused())
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Io(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 100 + 200 + 300 ms of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(600));
        assert!(elapsed < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn business_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let classifier = ErrorClassifier::new();
        let policy = RetryPolicy::new(5, Duration::from_millis(10));

        let result: Result<(), FetchError> = with_classified_retry(&policy, &classifier, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Business {
                    code: 42,
                    message: "bad coupon".into(),
                })
            }
        })
        .await;

        match result {
            Err(FetchError::Business { code, .. }) => assert_eq!(code, 42),
            other => panic!("Expected Business error, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn envelope_code_in_network_range_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let classifier = ErrorClassifier::new();
        let policy = RetryPolicy::new(3, Duration::from_millis(10));

        let result: Result<(), FetchError> = with_classified_retry(&policy, &classifier, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                RemoteResponse::<()>::failure(1001, "Order already paid").into_result()
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Business { code: 1001, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_stops_the_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::from_millis(10));

        let result = with_retry(
            &policy,
            |_: &FetchError| true,
            || {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(refused())
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_budget_calls_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), FetchError> = with_retry(
            &RetryPolicy::none(),
            |_: &FetchError| true,
            || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(refused())
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_millis(750));
    }
}
