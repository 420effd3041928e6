//! Normalized form of anything handed to the error handler

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use taskdeck_core::error::SharedSource;
use taskdeck_core::{AppError, ErrorKind};

pub(crate) const UNKNOWN_MESSAGE: &str = "An unknown error occurred";

/// A message-bearing error: either a taxonomy member or a foreign error
#[derive(Debug, Clone)]
pub enum CaughtError {
    App(AppError),
    Foreign {
        name: String,
        message: String,
        /// The original error, kept so its source chain can be logged
        cause: Option<SharedSource>,
    },
}

impl CaughtError {
    /// Wrap any standard error that is not already an `AppError`
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let name = short_type_name::<E>().to_string();
        Self::Foreign {
            name,
            message: err.to_string(),
            cause: Some(Arc::new(err)),
        }
    }

    /// Wrap a bare message
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::Foreign {
            name: "Error".to_string(),
            message: message.into(),
            cause: None,
        }
    }

    /// Stand-in for payloads that carry no usable message
    pub fn unknown() -> Self {
        Self::message_only(UNKNOWN_MESSAGE)
    }

    /// Normalize a panic payload: strings are kept, anything else is unknown
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<String>() {
            Ok(message) => Self::message_only(*message),
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(message) => Self::message_only(*message),
                None => Self::unknown(),
            },
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::App(err) => err.message(),
            Self::Foreign { message, .. } => message,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::App(err) => err.name(),
            Self::Foreign { name, .. } => name,
        }
    }

    /// The taxonomy member, if this is one
    pub fn as_app(&self) -> Option<&AppError> {
        match self {
            Self::App(err) => Some(err),
            Self::Foreign { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_app().map(AppError::kind)
    }

    /// Authentication or SessionExpired
    pub fn requires_sign_in(&self) -> bool {
        self.kind().is_some_and(ErrorKind::is_auth)
    }
}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for CaughtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::App(err) => err.source(),
            Self::Foreign { cause, .. } => cause.as_deref().and_then(|c| c.source()),
        }
    }
}

impl From<AppError> for CaughtError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<String> for CaughtError {
    fn from(message: String) -> Self {
        Self::message_only(message)
    }
}

impl From<&str> for CaughtError {
    fn from(message: &str) -> Self {
        Self::message_only(message)
    }
}

impl From<std::io::Error> for CaughtError {
    fn from(err: std::io::Error) -> Self {
        Self::from_error(err)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for CaughtError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => Self::App(*app),
            Err(other) => Self::Foreign {
                name: "Error".to_string(),
                message: other.to_string(),
                cause: Some(Arc::from(other)),
            },
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
