//! Redelivery policy applied to failing message handlers.
//!
//! A failed attempt is retried in-process with exponential backoff. Once the
//! retries are spent the consumer gives the message back to the broker
//! without requeueing it.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Retry policy configuration for exponential backoff.
///
/// # Default Values
///
/// - `max_retries`: 5
/// - `initial_interval`: 100ms
/// - `multiplier`: 1.5
/// - `max_interval`: 5 seconds
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Cap for any single delay
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_interval: Duration::from_millis(100),
            multiplier: 1.5,
            max_interval: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based).
    ///
    /// `initial_interval * multiplier ^ attempt`, capped at `max_interval`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return self.initial_interval.min(self.max_interval);
        }

        let delay_ms = self.initial_interval.as_millis() as f64
            * self.multiplier.powi(attempt.min(i32::MAX as usize) as i32);

        if !delay_ms.is_finite() || delay_ms >= self.max_interval.as_millis() as f64 {
            return self.max_interval;
        }

        Duration::from_millis(delay_ms as u64)
    }
}

/// Runs `operation` until it succeeds, returns an error `is_retryable`
/// rejects, or the policy's retries are exhausted. Returns the last error.
pub async fn retry_with_predicate<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempt, "Handler succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    tracing::warn!(error = %err, "Error is not retryable, failing immediately");
                    return Err(err);
                }

                if attempt >= policy.max_retries {
                    tracing::error!(attempt, error = %err, "Handler failed after max retries");
                    return Err(err);
                }

                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Handler failed, retrying"
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn should_grow_delay_by_multiplier() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_interval: Duration::from_millis(100),
            multiplier: 2.0,
            max_interval: Duration::from_secs(10),
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn should_cap_delay_at_max_interval() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(50), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(usize::MAX), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_after_max_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy {
            max_retries: 3,
            ..RetryPolicy::default()
        };

        let counter = calls.clone();
        let result: Result<(), String> = retry_with_predicate(
            &policy,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("boom".to_string()) }
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_value_once_operation_recovers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::default();

        let counter = calls.clone();
        let result = retry_with_predicate(
            &policy,
            || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(42)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_not_retry_when_predicate_rejects_error() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let result: Result<(), String> = retry_with_predicate(
            &RetryPolicy::default(),
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("malformed".to_string()) }
            },
            |err: &String| !err.contains("malformed"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
