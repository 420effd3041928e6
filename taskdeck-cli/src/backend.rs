//! Task backend
//!
//! [`TaskBackend`] is the storage collaborator the service talks to. Its
//! failures are raw `{ message, code }` payloads, the same shape the hosted
//! PostgREST backend returns, so they go through the regular classifier.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use taskdeck_core::classify::{CODE_JWT_INVALID, CODE_NO_ROWS, CODE_UNIQUE_VIOLATION};
use taskdeck_core::{NewTask, RawBackendError, Task, TaskCollection, TaskPatch};
use tokio::sync::Mutex;

use crate::session::SessionStore;
use crate::storage::MarkdownStorage;

#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Email of the signed-in user
    async fn current_user(&self) -> Result<String, RawBackendError>;

    async fn list(&self) -> Result<Vec<Task>, RawBackendError>;

    async fn create(&self, input: NewTask) -> Result<Task, RawBackendError>;

    async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task, RawBackendError>;

    async fn set_completed(&self, id: u32, completed: bool) -> Result<Task, RawBackendError>;

    async fn delete(&self, id: u32) -> Result<Task, RawBackendError>;
}

/// Backend over the local markdown file, guarded by the session file
pub struct LocalBackend {
    storage: MarkdownStorage,
    sessions: SessionStore,
    // serializes read-modify-write cycles on the task file
    write_lock: Arc<Mutex<()>>,
}

impl LocalBackend {
    pub fn new(storage: MarkdownStorage, sessions: SessionStore) -> Self {
        Self {
            storage,
            sessions,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn require_session(&self) -> Result<String, RawBackendError> {
        match self.sessions.load().await.map_err(storage_failure)? {
            Some(session) if !session.is_expired() => Ok(session.email),
            Some(_) => Err(RawBackendError::new("JWT expired").with_code(CODE_JWT_INVALID)),
            None => Err(RawBackendError::new("JWT missing").with_code(CODE_JWT_INVALID)),
        }
    }

    /// Load, change and save the collection under the write lock
    ///
    /// The cycle runs on its own task and holds the lock until it is done,
    /// even when the caller stops waiting.
    async fn modify<T, F>(&self, change: F) -> Result<T, RawBackendError>
    where
        F: FnOnce(&mut TaskCollection) -> Result<T, RawBackendError> + Send + 'static,
        T: Send + 'static,
    {
        self.require_session().await?;

        let guard = self.write_lock.clone().lock_owned().await;
        let storage = self.storage.clone();

        let cycle = tokio::spawn(async move {
            let _guard = guard;
            let mut collection = storage.load().await.map_err(storage_failure)?;
            let value = change(&mut collection)?;
            storage.save(&collection).await.map_err(storage_failure)?;
            Ok::<T, RawBackendError>(value)
        });

        match cycle.await {
            Ok(result) => result,
            Err(err) => Err(RawBackendError::new(format!("Task storage failed: {}", err))),
        }
    }
}

fn storage_failure(err: io::Error) -> RawBackendError {
    RawBackendError::new(format!("Task storage failed: {}", err))
}

fn no_rows(id: u32) -> RawBackendError {
    RawBackendError::new(format!("No task with id {}", id)).with_code(CODE_NO_ROWS)
}

fn duplicate_title(title: &str) -> RawBackendError {
    RawBackendError::new(format!(
        "duplicate key value violates unique constraint \"tasks_open_title_key\" ({})",
        title
    ))
    .with_code(CODE_UNIQUE_VIOLATION)
}

#[async_trait]
impl TaskBackend for LocalBackend {
    async fn current_user(&self) -> Result<String, RawBackendError> {
        self.require_session().await
    }

    async fn list(&self) -> Result<Vec<Task>, RawBackendError> {
        self.require_session().await?;
        let collection = self.storage.load().await.map_err(storage_failure)?;
        Ok(collection.list_all().into_iter().cloned().collect())
    }

    async fn create(&self, input: NewTask) -> Result<Task, RawBackendError> {
        self.modify(move |collection| {
            if collection.find_open_by_title(&input.title).is_some() {
                return Err(duplicate_title(&input.title));
            }
            Ok(collection.add(input).clone())
        })
        .await
    }

    async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task, RawBackendError> {
        self.modify(move |collection| {
            if let Some(title) = &patch.title
                && collection
                    .find_open_by_title(title)
                    .is_some_and(|other| other.id != id)
            {
                return Err(duplicate_title(title));
            }

            let task = collection.get_mut(id).ok_or_else(|| no_rows(id))?;
            task.apply(&patch);
            Ok(task.clone())
        })
        .await
    }

    async fn set_completed(&self, id: u32, completed: bool) -> Result<Task, RawBackendError> {
        self.modify(move |collection| {
            collection
                .set_completed(id, completed)
                .map(Task::clone)
                .map_err(|_| no_rows(id))
        })
        .await
    }

    async fn delete(&self, id: u32) -> Result<Task, RawBackendError> {
        self.modify(move |collection| collection.remove(id).ok_or_else(|| no_rows(id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use chrono::TimeDelta;
    use taskdeck_core::{ErrorKind, classify};

    fn backend(dir: &tempfile::TempDir) -> (LocalBackend, SessionStore) {
        let sessions = SessionStore::new(dir.path().join("session.json"));
        let backend = LocalBackend::new(
            MarkdownStorage::new(dir.path().join("tasks.md")),
            sessions.clone(),
        );
        (backend, sessions)
    }

    async fn signed_in(dir: &tempfile::TempDir) -> LocalBackend {
        let (backend, sessions) = backend(dir);
        let session = Session::start("me@example.com", TimeDelta::hours(1)).unwrap();
        sessions.save(&session).await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_no_session_is_session_expired() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _) = backend(&dir);

        let raw = backend.list().await.unwrap_err();
        assert_eq!(raw.code.as_deref(), Some(CODE_JWT_INVALID));
        assert_eq!(classify(&raw).kind(), ErrorKind::SessionExpired);
    }

    #[tokio::test]
    async fn test_expired_session() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, sessions) = backend(&dir);
        let session = Session::start("me@example.com", TimeDelta::hours(-1)).unwrap();
        sessions.save(&session).await.unwrap();

        let raw = backend.current_user().await.unwrap_err();
        assert_eq!(raw.message.as_deref(), Some("JWT expired"));
    }

    #[tokio::test]
    async fn test_create_list_complete_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = signed_in(&dir).await;

        let created = backend.create(NewTask::new("Pay rent")).await.unwrap();
        assert_eq!(created.id, 1);

        let done = backend.set_completed(created.id, true).await.unwrap();
        assert!(done.completed);

        let tasks = backend.list().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);

        let removed = backend.delete(created.id).await.unwrap();
        assert_eq!(removed.title, "Pay rent");
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_open_title() {
        let dir = tempfile::tempdir().unwrap();
        let backend = signed_in(&dir).await;

        backend.create(NewTask::new("Pay rent")).await.unwrap();
        let raw = backend.create(NewTask::new("pay rent")).await.unwrap_err();

        let err = classify(&raw);
        assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_missing_row() {
        let dir = tempfile::tempdir().unwrap();
        let backend = signed_in(&dir).await;

        let raw = backend.delete(42).await.unwrap_err();
        let err = classify(&raw);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Record not found");
    }

    #[tokio::test]
    async fn test_rename_to_own_title_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = signed_in(&dir).await;
        let task = backend.create(NewTask::new("Draft")).await.unwrap();

        let patch = TaskPatch {
            title: Some("draft".to_string()),
            ..TaskPatch::default()
        };
        let updated = backend.update(task.id, patch).await.unwrap();
        assert_eq!(updated.title, "draft");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writes_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(signed_in(&dir).await);

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let backend = backend.clone();
                tokio::spawn(async move { backend.create(NewTask::new(format!("Task {}", n))).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let tasks = backend.list().await.unwrap();
        assert_eq!(tasks.len(), 8);
        let mut ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }
}
