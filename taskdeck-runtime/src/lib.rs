//! Taskdeck Runtime - retry, timeout and error presentation
//!
//! Async plumbing that sits between a failing backend call and the user:
//!
//! 1. **Retry** (`retry`) - capped exponential backoff driven by the error taxonomy
//! 2. **Timeout** (`timeout`) - race an operation against a deadline
//! 3. **Handler** (`handler`) - log, notify and redirect from one place
//!
//! # Example
//!
//! ```rust,ignore
//! use taskdeck_core::{classify, RawBackendError};
//! use taskdeck_runtime::{with_retry, ErrorHandler, RetryOptions};
//!
//! async fn load(handler: &ErrorHandler) {
//!     let result = with_retry(
//!         || async { fetch_tasks().await.map_err(|raw: RawBackendError| classify(&raw)) },
//!         &RetryOptions::default(),
//!     )
//!     .await;
//!
//!     if let Err(err) = result {
//!         handler.report(err, Some("Fetch Tasks"));
//!     }
//! }
//! ```

pub mod caught;
pub mod handler;
pub mod navigate;
pub mod notify;
pub mod retry;
pub mod safe;
pub mod timeout;

pub use caught::CaughtError;
pub use handler::{ErrorHandler, ErrorHandlerConfig, HandleOptions, user_message};
pub use navigate::{LOGIN_ROUTE, Navigator, REDIRECT_DELAY, ScheduledRedirect};
pub use notify::{DesktopNotifier, Notifier, TerminalNotifier, Toast, ToastStyle};
pub use retry::{RetryOptions, RetryableError, backoff_delay, with_retry, with_retry_observed};
pub use safe::{safe_async, with_error_handling};
pub use timeout::{DEFAULT_TIMEOUT, with_timeout};
