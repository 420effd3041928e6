//! Retry with capped exponential backoff
//!
//! Attempts run strictly one after another. Whether a failure is worth
//! another attempt is decided by the error taxonomy alone: operational
//! errors (validation, not found, ...) are final, except `Network`.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskdeck_core::AppError;

use crate::caught::CaughtError;

/// Classification the retry engine needs from an error
pub trait RetryableError: std::error::Error {
    /// Expected, user-facing condition
    fn is_operational(&self) -> bool;

    /// Transport failure that may clear up on its own
    fn is_network(&self) -> bool {
        false
    }

    fn is_retryable(&self) -> bool {
        !self.is_operational() || self.is_network()
    }
}

impl RetryableError for AppError {
    fn is_operational(&self) -> bool {
        AppError::is_operational(self)
    }

    fn is_network(&self) -> bool {
        AppError::is_network(self)
    }
}

impl RetryableError for CaughtError {
    fn is_operational(&self) -> bool {
        self.as_app().is_some_and(AppError::is_operational)
    }

    fn is_network(&self) -> bool {
        self.as_app().is_some_and(AppError::is_network)
    }
}

// Raw I/O failures are never part of the taxonomy
impl RetryableError for std::io::Error {
    fn is_operational(&self) -> bool {
        false
    }
}

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Total number of attempts, including the first one
    pub max_retries: u32,
    /// Delay before the second attempt
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay
    pub max_delay_ms: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Number of attempts actually made; zero is treated as one
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Delay after the failed attempt with index `attempt` (0-based):
/// `min(initial * 2^attempt, max)`
pub fn backoff_delay(options: &RetryOptions, attempt: u32) -> Duration {
    let factor = 2_u64.checked_pow(attempt).unwrap_or(u64::MAX);
    let millis = options
        .initial_delay_ms
        .saturating_mul(factor)
        .min(options.max_delay_ms);
    Duration::from_millis(millis)
}

/// Run `operation` until it succeeds, fails with a final error, or runs out
/// of attempts
pub async fn with_retry<F, Fut, T, E>(operation: F, options: &RetryOptions) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    with_retry_observed(operation, options, |_, _| {}).await
}

/// Like [`with_retry`], calling `on_retry(attempt, &error)` before each wait.
/// `attempt` is 1 for the first retry.
pub async fn with_retry_observed<F, Fut, T, E, O>(
    mut operation: F,
    options: &RetryOptions,
    mut on_retry: O,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
    O: FnMut(u32, &E),
{
    let attempts = options.attempts();
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::debug!(error = %err, "not retrying operational error");
            return Err(err);
        }

        if attempt + 1 >= attempts {
            tracing::debug!(attempts, error = %err, "giving up after final attempt");
            return Err(err);
        }

        let delay = backoff_delay(options, attempt);
        on_retry(attempt + 1, &err);
        tracing::info!(
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying after failure"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::ErrorKind;
    use tokio::time::Instant;

    #[test]
    fn test_backoff_sequence() {
        let options = RetryOptions::default();
        let delays: Vec<u64> = (0..7)
            .map(|a| backoff_delay(&options, a).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000, 10_000, 10_000]);
    }

    #[test]
    fn test_backoff_saturates() {
        let options = RetryOptions::default().with_max_delay(Duration::from_secs(3600));
        assert_eq!(backoff_delay(&options, 200), Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_error_is_not_retried() {
        let mut calls = 0;
        let options = RetryOptions::default().with_max_retries(5);

        let result: Result<(), AppError> = with_retry(
            || {
                calls += 1;
                async { Err(AppError::validation("Task title is required")) }
            },
            &options,
        )
        .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried_until_success() {
        let mut calls = 0;
        let mut observed = Vec::new();
        let started = Instant::now();

        let result = with_retry_observed(
            || {
                calls += 1;
                let n = calls;
                async move {
                    if n < 3 {
                        Err(AppError::network())
                    } else {
                        Ok("tasks")
                    }
                }
            },
            &RetryOptions::default(),
            |attempt, err: &AppError| observed.push((attempt, err.kind())),
        )
        .await;

        assert_eq!(result.unwrap(), "tasks");
        assert_eq!(calls, 3);
        assert_eq!(observed, vec![(1, ErrorKind::Network), (2, ErrorKind::Network)]);
        // 1000ms + 2000ms of backoff
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_does_not_wait() {
        let started = Instant::now();
        let result: Result<u32, AppError> = with_retry(|| async { Ok(7) }, &RetryOptions::default()).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_faults_exhaust_all_attempts() {
        let mut calls = 0;
        let result: Result<(), AppError> = with_retry(
            || {
                calls += 1;
                async { Err(AppError::with_operational("pool exhausted", 500, false)) }
            },
            &RetryOptions::default(),
        )
        .await;

        assert_eq!(result.unwrap_err().message(), "pool exhausted");
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt() {
        for max_retries in [0, 1] {
            let mut calls = 0;
            let mut retries = 0;
            let result: Result<(), AppError> = with_retry_observed(
                || {
                    calls += 1;
                    async { Err(AppError::network()) }
                },
                &RetryOptions::default().with_max_retries(max_retries),
                |_, _| retries += 1,
            )
            .await;

            assert!(result.is_err());
            assert_eq!(calls, 1);
            assert_eq!(retries, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_and_offline_are_final() {
        for err in [AppError::timeout(None), AppError::offline()] {
            let mut calls = 0;
            let expected = err.kind();
            let result: Result<(), AppError> = with_retry(
                || {
                    calls += 1;
                    let err = err.clone();
                    async move { Err(err) }
                },
                &RetryOptions::default(),
            )
            .await;

            assert_eq!(result.unwrap_err().kind(), expected);
            assert_eq!(calls, 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_io_errors_are_retried() {
        let mut calls = 0;
        let result: Result<(), std::io::Error> = with_retry(
            || {
                calls += 1;
                async { Err(std::io::Error::new(std::io::ErrorKind::Other, "flaky disk")) }
            },
            &RetryOptions::default().with_initial_delay(Duration::from_millis(10)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RetryOptions = serde_json::from_str(r#"{"max_retries":5}"#).unwrap();
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.initial_delay_ms, 1000);
        assert_eq!(options.max_delay_ms, 10_000);
    }
}
