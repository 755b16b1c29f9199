use crate::cancel::CancelSignal;
use crate::errors::{ResilientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of retries after the first attempt (`0` = exactly one attempt)
    pub max_retries: u32,
    /// Backoff delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Outcome of a single attempt, reported by the attempt closure.
///
/// The retryer interprets only this signal; it knows nothing about
/// transports or status codes. An error is optional in both directions: a
/// retry may be a policy choice with no failure attached, and a final outcome
/// may carry the error that should surface.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Stop here; the optional error (or success) is the final result.
    Done(Option<ResilientError>),
    /// Try again after backoff, recording the optional error as last-seen.
    Retry(Option<ResilientError>),
}

/// Bounded retry executor with deterministic exponential backoff.
///
/// Runs an attempt closure up to `max_retries + 1` times, sleeping
/// `min(base_delay * 2^k, max_delay)` between attempts. Carries no state
/// between calls to [`execute`](Self::execute).
pub struct Retryer {
    config: RetryConfig,
}

impl Retryer {
    /// Create a new retryer with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `attempt` until it reports [`AttemptOutcome::Done`], the retry
    /// budget is exhausted, or the cancellation signal fires.
    ///
    /// Cancellation is checked before every attempt and races every backoff
    /// sleep; once fired it always wins over starting a new attempt. If the
    /// budget runs out, the last recorded error is returned; exhaustion with
    /// no recorded error is a success.
    pub async fn execute<F, Fut>(&self, cancel: &CancelSignal, mut attempt: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome>,
    {
        let mut last_error = None;

        for attempt_idx in 0..=self.config.max_retries {
            cancel.check()?;

            match attempt().await {
                AttemptOutcome::Done(None) => return Ok(()),
                AttemptOutcome::Done(Some(err)) => return Err(err),
                AttemptOutcome::Retry(err) => last_error = err,
            }

            if attempt_idx < self.config.max_retries {
                let delay = self.backoff_delay(attempt_idx);
                debug!(
                    attempt = attempt_idx + 1,
                    delay_ms = delay.as_millis() as u64,
                    "attempt signalled retry, backing off"
                );
                tokio::select! {
                    err = cancel.cancelled() => return Err(err),
                    _ = sleep(delay) => {}
                }
            }
        }

        warn!(
            max_retries = self.config.max_retries,
            "retry budget exhausted"
        );
        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Backoff delay for the 0-indexed attempt `k`: `min(base * 2^k, max)`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = self
            .config
            .base_delay
            .saturating_mul(1u32 << attempt.min(31));
        delay.min(self.config.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use test_case::test_case;
    use tokio::time::Instant;

    fn retryer(max_retries: u32, base_ms: u64, max_ms: u64) -> Retryer {
        Retryer::new(RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        })
    }

    #[test_case(0 => 100 ; "first retry uses base delay")]
    #[test_case(1 => 200 ; "doubles on second")]
    #[test_case(2 => 400 ; "doubles on third")]
    #[test_case(3 => 800 ; "doubles on fourth")]
    #[test_case(4 => 1000 ; "capped at max delay")]
    #[test_case(5 => 1000 ; "stays capped")]
    fn backoff_table(attempt: u32) -> u64 {
        let retryer = retryer(10, 100, 1000);
        retryer.backoff_delay(attempt).as_millis() as u64
    }

    #[test]
    fn test_backoff_zero_base_is_zero() {
        let retryer = retryer(10, 0, 1000);
        assert_eq!(retryer.backoff_delay(0), Duration::ZERO);
        assert_eq!(retryer.backoff_delay(7), Duration::ZERO);
    }

    #[test]
    fn test_backoff_large_attempt_saturates_at_max() {
        let retryer = retryer(64, 100, 5000);
        assert_eq!(retryer.backoff_delay(40), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn test_done_on_first_attempt() {
        let retryer = retryer(3, 0, 0);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&CancelSignal::new(), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Done(None)
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_done_with_error_is_not_retried() {
        let retryer = retryer(3, 0, 0);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&CancelSignal::new(), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Done(Some(ResilientError::Configuration {
                        message: "bad request".to_string(),
                    }))
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(ResilientError::Configuration { .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_always_retry_runs_budget_and_returns_last_error() {
        let retryer = retryer(2, 0, 0);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&CancelSignal::new(), move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Retry(Some(ResilientError::Network {
                        message: format!("attempt {}", n),
                    }))
                }
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(ResilientError::Network { message }) => assert_eq!(message, "attempt 2"),
            other => panic!("expected last network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exhaustion_without_error_is_success() {
        let retryer = retryer(2, 0, 0);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&CancelSignal::new(), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Retry(None)
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let retryer = retryer(0, 0, 0);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&CancelSignal::new(), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Retry(Some(ResilientError::Network {
                        message: "boom".to_string(),
                    }))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_makes_zero_attempts() {
        let retryer = retryer(3, 0, 0);
        let cancel = CancelSignal::new();
        cancel.cancel();
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = retryer
            .execute(&cancel, move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    AttemptOutcome::Retry(None)
                }
            })
            .await;

        assert!(matches!(result, Err(ResilientError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_backoff_aborts_sleep() {
        let retryer = Arc::new(retryer(3, 60_000, 60_000));
        let cancel = CancelSignal::new();

        let signal = cancel.clone();
        let worker = retryer.clone();
        let start = Instant::now();
        let handle = tokio::spawn(async move {
            worker
                .execute(&signal, || async { AttemptOutcome::Retry(None) })
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ResilientError::Cancelled)));
        // The 60s backoff was abandoned, not waited out.
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_mid_backoff() {
        let retryer = retryer(3, 60_000, 60_000);
        let cancel = CancelSignal::with_deadline(Duration::from_millis(50));

        let result = retryer
            .execute(&cancel, || async { AttemptOutcome::Retry(None) })
            .await;

        assert!(matches!(result, Err(ResilientError::DeadlineExceeded)));
    }
}
