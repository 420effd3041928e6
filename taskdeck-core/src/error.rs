//! Application error taxonomy
//!
//! Every failure that reaches the user is an [`AppError`]: a single value
//! tagged with an [`ErrorKind`] instead of a class hierarchy. The kind fixes a
//! default status code and message; the status code follows HTTP conventions
//! but is only a classification, it never has to travel over a network.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Shared source error, cloneable so an `AppError` can be dispatched and
/// still handed back to the caller.
pub type SharedSource = Arc<dyn std::error::Error + Send + Sync>;

/// Closed set of application error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The base error: caller-supplied message and status
    Generic,

    // Authentication
    Authentication,
    Unauthorized,
    SessionExpired,

    // Validation
    Validation,
    InvalidInput,

    // Database
    Database,
    RecordNotFound,
    DuplicateRecord,

    // Network
    Network,
    Timeout,
    Offline,

    // Task operations
    Task,
    TaskNotFound,
    TaskUpdate,
    TaskDelete,
    TaskCreate,

    RateLimit,
    Server,
    ServiceUnavailable,
}

impl ErrorKind {
    /// Status code a fresh error of this kind carries
    pub fn default_status(self) -> u16 {
        match self {
            Self::Generic | Self::Database | Self::Server => 500,
            Self::TaskUpdate | Self::TaskDelete | Self::TaskCreate => 500,
            Self::Authentication | Self::SessionExpired => 401,
            Self::Unauthorized => 403,
            Self::Validation | Self::InvalidInput | Self::Task => 400,
            Self::RecordNotFound | Self::TaskNotFound => 404,
            Self::DuplicateRecord => 409,
            Self::Timeout => 408,
            Self::RateLimit => 429,
            Self::Network | Self::Offline | Self::ServiceUnavailable => 503,
        }
    }

    /// Message a fresh error of this kind carries
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Generic => "An unexpected error occurred",
            Self::Authentication => "Authentication failed",
            Self::Unauthorized => "Unauthorized access",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::Validation => "Validation failed",
            Self::InvalidInput => "Invalid input provided",
            Self::Database => "Database operation failed",
            Self::RecordNotFound => "Resource not found",
            Self::DuplicateRecord => "Record already exists",
            Self::Network => "Network request failed",
            Self::Timeout => "Request timed out",
            Self::Offline => "You appear to be offline. Please check your internet connection.",
            Self::Task => "Task operation failed",
            Self::TaskNotFound => "Task not found",
            Self::TaskUpdate => "Failed to update task",
            Self::TaskDelete => "Failed to delete task",
            Self::TaskCreate => "Failed to create task",
            Self::RateLimit => "Too many requests. Please try again later.",
            Self::Server => "Internal server error",
            Self::ServiceUnavailable => "Service temporarily unavailable",
        }
    }

    /// Type name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "AppError",
            Self::Authentication => "AuthenticationError",
            Self::Unauthorized => "UnauthorizedError",
            Self::SessionExpired => "SessionExpiredError",
            Self::Validation => "ValidationError",
            Self::InvalidInput => "InvalidInputError",
            Self::Database => "DatabaseError",
            Self::RecordNotFound => "RecordNotFoundError",
            Self::DuplicateRecord => "DuplicateRecordError",
            Self::Network => "NetworkError",
            Self::Timeout => "TimeoutError",
            Self::Offline => "OfflineError",
            Self::Task => "TaskError",
            Self::TaskNotFound => "TaskNotFoundError",
            Self::TaskUpdate => "TaskUpdateError",
            Self::TaskDelete => "TaskDeleteError",
            Self::TaskCreate => "TaskCreateError",
            Self::RateLimit => "RateLimitError",
            Self::Server => "ServerError",
            Self::ServiceUnavailable => "ServiceUnavailableError",
        }
    }

    /// Kinds that mean the user has to sign in again
    pub fn is_auth(self) -> bool {
        matches!(self, Self::Authentication | Self::SessionExpired)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified application error
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    status_code: u16,
    operational: bool,
    fields: Option<BTreeMap<String, String>>,
    #[source]
    source: Option<SharedSource>,
}

impl AppError {
    /// Create a base error with a message and status code
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self::with_operational(message, status_code, true)
    }

    /// Create a base error, optionally marking it as a non-operational fault
    pub fn with_operational(
        message: impl Into<String>,
        status_code: u16,
        operational: bool,
    ) -> Self {
        Self {
            kind: ErrorKind::Generic,
            message: message.into(),
            status_code,
            operational,
            fields: None,
            source: None,
        }
    }

    /// Create an error of the given kind with its default message
    pub fn of(kind: ErrorKind) -> Self {
        Self::of_with_message(kind, kind.default_message())
    }

    /// Create an error of the given kind with a custom message
    pub fn of_with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.default_status(),
            operational: true,
            fields: None,
            source: None,
        }
    }

    pub fn authentication() -> Self {
        Self::of(ErrorKind::Authentication)
    }

    pub fn unauthorized() -> Self {
        Self::of(ErrorKind::Unauthorized)
    }

    pub fn session_expired() -> Self {
        Self::of(ErrorKind::SessionExpired)
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::of_with_message(ErrorKind::Validation, message)
    }

    /// Create a validation error with per-field messages
    pub fn validation_with_fields(
        message: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) -> Self {
        let mut err = Self::validation(message);
        err.fields = Some(fields);
        err
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::of_with_message(ErrorKind::InvalidInput, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::of_with_message(ErrorKind::Database, message)
    }

    /// Create a not-found error for the named resource ("Task not found")
    pub fn record_not_found(resource: &str) -> Self {
        Self::of_with_message(ErrorKind::RecordNotFound, format!("{} not found", resource))
    }

    pub fn duplicate_record(message: impl Into<String>) -> Self {
        Self::of_with_message(ErrorKind::DuplicateRecord, message)
    }

    pub fn network() -> Self {
        Self::of(ErrorKind::Network)
    }

    /// Create a timeout error, falling back to the default message
    pub fn timeout(message: Option<String>) -> Self {
        match message {
            Some(msg) => Self::of_with_message(ErrorKind::Timeout, msg),
            None => Self::of(ErrorKind::Timeout),
        }
    }

    pub fn offline() -> Self {
        Self::of(ErrorKind::Offline)
    }

    /// Create a generic task error with a custom status code
    pub fn task(message: impl Into<String>, status_code: u16) -> Self {
        let mut err = Self::of_with_message(ErrorKind::Task, message);
        err.status_code = status_code;
        err
    }

    pub fn task_not_found() -> Self {
        Self::of(ErrorKind::TaskNotFound)
    }

    pub fn rate_limit() -> Self {
        Self::of(ErrorKind::RateLimit)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::of_with_message(ErrorKind::Server, message)
    }

    pub fn service_unavailable() -> Self {
        Self::of(ErrorKind::ServiceUnavailable)
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// True for expected, user-facing conditions
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Field-level messages of a validation error
    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.message == other.message
            && self.status_code == other.status_code
            && self.operational == other.operational
            && self.fields == other.fields
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, AppError>;
