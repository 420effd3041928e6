//! Call-site helpers around the error handler

use std::future::Future;

use crate::caught::CaughtError;
use crate::handler::{ErrorHandler, HandleOptions};

/// Run `operation`, reporting a failure through `handler` and then returning
/// it unchanged to the caller
pub async fn with_error_handling<Fut, T, E>(
    handler: &ErrorHandler,
    context: &str,
    options: &HandleOptions,
    operation: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Clone + Into<CaughtError>,
{
    match operation.await {
        Ok(value) => Ok(value),
        Err(err) => {
            // a scheduled redirect outlives this call on its own
            let _ = handler.handle(err.clone(), Some(context), options);
            Err(err)
        }
    }
}

/// Turn failure into a value: `(Some(error), None)` or `(None, Some(value))`
pub async fn safe_async<Fut, T, E>(operation: Fut) -> (Option<CaughtError>, Option<T>)
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<CaughtError>,
{
    match operation.await {
        Ok(value) => (None, Some(value)),
        Err(err) => (Some(err.into()), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notifier, Toast};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use taskdeck_core::{AppError, ErrorKind};

    #[derive(Default)]
    struct CountingNotifier(AtomicUsize);

    impl Notifier for CountingNotifier {
        fn notify(&self, _toast: &Toast) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_safe_async_success() {
        let (err, value) = safe_async(async { Ok::<_, AppError>(3) }).await;
        assert!(err.is_none());
        assert_eq!(value, Some(3));
    }

    #[tokio::test]
    async fn test_safe_async_failure() {
        let (err, value) = safe_async(async { Err::<u8, _>(AppError::task_not_found()) }).await;
        assert!(value.is_none());
        assert_eq!(err.and_then(|e| e.kind()), Some(ErrorKind::TaskNotFound));

        let (err, _) = safe_async(async { Err::<u8, _>("plain failure") }).await;
        assert_eq!(err.map(|e| e.message().to_string()).as_deref(), Some("plain failure"));
    }

    #[tokio::test]
    async fn test_with_error_handling_reports_and_returns_original() {
        let notifier = Arc::new(CountingNotifier::default());
        let handler = ErrorHandler::default().with_notifier(notifier.clone());

        let result: Result<(), AppError> = with_error_handling(
            &handler,
            "Delete Task",
            &HandleOptions::default(),
            async { Err(AppError::of(ErrorKind::TaskDelete)) },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TaskDelete);
        assert_eq!(err.message(), "Failed to delete task");
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_error_handling_success_is_silent() {
        let notifier = Arc::new(CountingNotifier::default());
        let handler = ErrorHandler::default().with_notifier(notifier.clone());

        let value = with_error_handling(&handler, "Fetch Tasks", &HandleOptions::default(), async {
            Ok::<_, AppError>(vec![1, 2])
        })
        .await
        .unwrap();

        assert_eq!(value, vec![1, 2]);
        assert_eq!(notifier.0.load(Ordering::SeqCst), 0);
    }
}
