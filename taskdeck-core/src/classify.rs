//! Backend error classification
//!
//! Translates the opaque `{ message, code }` payloads returned by the task
//! backend (PostgREST and Postgres codes) into [`AppError`] values.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// PostgREST: JWT rejected
pub const CODE_JWT_INVALID: &str = "PGRST301";
/// PostgREST: zero rows where one was requested
pub const CODE_NO_ROWS: &str = "PGRST116";
/// Postgres: unique constraint violation
pub const CODE_UNIQUE_VIOLATION: &str = "23505";
/// Postgres: foreign key violation
pub const CODE_FOREIGN_KEY_VIOLATION: &str = "23503";

const FALLBACK_MESSAGE: &str = "Database operation failed";

/// Error payload as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBackendError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl RawBackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for RawBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self.message.as_deref().unwrap_or(FALLBACK_MESSAGE);
        match &self.code {
            Some(code) => write!(f, "{} ({})", message, code),
            None => f.write_str(message),
        }
    }
}

impl std::error::Error for RawBackendError {}

/// Map a backend error payload to an application error
///
/// Rules are checked in order and the first match wins.
pub fn classify(raw: &RawBackendError) -> AppError {
    let message = raw.message.as_deref().unwrap_or(FALLBACK_MESSAGE);
    let code = raw.code.as_deref();

    if code == Some(CODE_JWT_INVALID) || message.contains("JWT") {
        return AppError::session_expired();
    }

    match code {
        Some(CODE_UNIQUE_VIOLATION) => {
            return AppError::duplicate_record("This record already exists");
        }
        Some(CODE_FOREIGN_KEY_VIOLATION) => {
            return AppError::new("Cannot delete: related records exist", 400);
        }
        Some(CODE_NO_ROWS) => return AppError::new("Record not found", 404),
        _ => {}
    }

    if message.contains("row-level security") {
        return AppError::new("You do not have permission to perform this action", 403);
    }

    if message.contains("fetch") || message.contains("network") {
        return AppError::network();
    }

    AppError::new(message, 500)
}

/// Reports whether the host currently has a network connection
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Stand-in for hosts that cannot report connectivity
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

impl<F: Fn() -> bool> Connectivity for F {
    fn is_online(&self) -> bool {
        self()
    }
}

/// A transport-level failure, before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkFailure {
    /// Error type name reported by the transport, e.g. "TimeoutError"
    pub name: Option<String>,
    pub message: String,
}

impl NetworkFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }
}

impl From<&std::io::Error> for NetworkFailure {
    fn from(err: &std::io::Error) -> Self {
        let name = match err.kind() {
            std::io::ErrorKind::TimedOut => Some("TimeoutError".to_string()),
            _ => None,
        };
        Self {
            name,
            message: err.to_string(),
        }
    }
}

/// Map a transport failure to Offline, Timeout or Network
pub fn classify_network(failure: &NetworkFailure, connectivity: &impl Connectivity) -> AppError {
    if !connectivity.is_online() {
        return AppError::offline();
    }

    if failure.name.as_deref() == Some("TimeoutError") || failure.message.contains("timeout") {
        return AppError::timeout(None);
    }

    AppError::network()
}
