//! Deadline race for a single operation
//!
//! The operation is spawned and raced against a timer. When the timer wins
//! the caller gets a `Timeout` error, but the operation is not aborted: it
//! keeps running on the runtime and its result is dropped.

use std::future::Future;
use std::time::Duration;

use taskdeck_core::AppError;

/// Deadline used when the caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Race `operation` against `timeout`
///
/// Errors produced by the operation are returned unchanged. A panic inside
/// the operation is resumed on the caller.
pub async fn with_timeout<F, T, E>(
    operation: F,
    timeout: Duration,
    message: Option<String>,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<AppError> + Send + 'static,
{
    let mut handle = tokio::spawn(operation);

    tokio::select! {
        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(join_err) => Err(E::from(
                AppError::server("Operation was cancelled before completing").with_source(join_err),
            )),
        },
        _ = tokio::time::sleep(timeout) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "operation timed out, leaving it to finish in the background"
            );
            Err(E::from(AppError::timeout(message)))
        }
    }
}
