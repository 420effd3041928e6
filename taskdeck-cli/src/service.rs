//! Task operations as the front end sees them
//!
//! Every call is validated first, then run against the backend with a
//! deadline and retries. Raw backend failures are classified right here, so
//! callers only ever see `AppError`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use taskdeck_core::{AppError, NewTask, RawBackendError, Task, TaskPatch, classify};
use taskdeck_runtime::{RetryOptions, with_retry_observed, with_timeout};

use crate::backend::TaskBackend;

const CANNOT_EDIT_COMPLETED: &str = "Cannot edit completed tasks";

pub struct TaskService {
    backend: Arc<dyn TaskBackend>,
    retry: RetryOptions,
    timeout: Duration,
}

impl TaskService {
    pub fn new(backend: Arc<dyn TaskBackend>, retry: RetryOptions, timeout: Duration) -> Self {
        Self {
            backend,
            retry,
            timeout,
        }
    }

    pub async fn current_user(&self) -> Result<String, AppError> {
        self.call("Loading your account", |b| async move { b.current_user().await })
            .await
    }

    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        self.call("Loading tasks", |b| async move { b.list().await })
            .await
    }

    pub async fn create(&self, input: NewTask) -> Result<Task, AppError> {
        let input = input.validated()?;
        self.call("Creating the task", move |b| {
            let input = input.clone();
            async move { b.create(input).await }
        })
        .await
    }

    /// Edit an open task; completed tasks are read-only
    pub async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task, AppError> {
        let patch = patch.validated()?;

        let tasks = self.list().await?;
        if tasks.iter().any(|task| task.id == id && task.completed) {
            return Err(AppError::task(CANNOT_EDIT_COMPLETED, 409));
        }

        self.call("Updating the task", move |b| {
            let patch = patch.clone();
            async move { b.update(id, patch).await }
        })
        .await
    }

    pub async fn set_completed(&self, id: u32, completed: bool) -> Result<Task, AppError> {
        self.call("Updating the task", move |b| async move {
            b.set_completed(id, completed).await
        })
        .await
    }

    pub async fn delete(&self, id: u32) -> Result<Task, AppError> {
        self.call("Deleting the task", move |b| async move { b.delete(id).await })
            .await
    }

    /// Run one backend operation with timeout, classification and retries
    async fn call<T, F, Fut>(&self, action: &str, operation: F) -> Result<T, AppError>
    where
        F: Fn(Arc<dyn TaskBackend>) -> Fut,
        Fut: Future<Output = Result<T, RawBackendError>> + Send + 'static,
        T: Send + 'static,
    {
        let timeout_message = format!("{} took too long. Please try again.", action);

        with_retry_observed(
            || {
                let attempt = operation(self.backend.clone());
                with_timeout(
                    async move { attempt.await.map_err(|raw| classify(&raw)) },
                    self.timeout,
                    Some(timeout_message.clone()),
                )
            },
            &self.retry,
            |attempt, err| tracing::warn!(attempt, error = %err, "{} failed, retrying", action),
        )
        .await
    }
}
