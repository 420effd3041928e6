//! Local sign-in session
//!
//! A session is a small JSON file with the signed-in email and an expiry.
//! The backend refuses to touch tasks without a live one.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub issued_at: DateTime<Local>,
    pub expires_at: DateTime<Local>,
}

impl Session {
    /// Start a session lasting `ttl`; `None` when the expiry is not representable
    pub fn start(email: impl Into<String>, ttl: TimeDelta) -> Option<Self> {
        let now = Local::now();
        Some(Self {
            email: email.into(),
            issued_at: now,
            expires_at: now.checked_add_signed(ttl)?,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Local>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Local::now())
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current session, if any. An unreadable file counts as no session.
    pub async fn load(&self) -> io::Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
        fs::write(&self.path, json).await
    }

    /// Remove the session; returns whether one existed
    pub async fn clear(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let session = Session::start("me@example.com", TimeDelta::hours(1)).unwrap();
        assert!(!session.is_expired());
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.issued_at + TimeDelta::hours(2)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_rejected() {
        let huge = TimeDelta::try_hours(i64::MAX / 3_600_000).unwrap();
        assert!(Session::start("me@example.com", huge).is_none());
        assert!(Session::start("me@example.com", TimeDelta::MAX).is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);

        let session = Session::start("me@example.com", TimeDelta::days(7)).unwrap();
        store.save(&session).await.unwrap();
        assert_eq!(
            store.load().await.unwrap().map(|s| s.email),
            Some("me@example.com".to_string())
        );

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(SessionStore::new(path).load().await.unwrap(), None);
    }
}
