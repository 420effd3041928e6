//! Central error sink
//!
//! [`ErrorHandler::handle`] is where every failure ends up: it logs the
//! error, shows a toast, runs the caller's callback and, for authentication
//! failures, schedules a redirect to the login entry point. It never fails.

pub mod config;
pub mod message;

use std::error::Error as _;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::caught::CaughtError;
use crate::navigate::{LOGIN_ROUTE, Navigator, NoopNavigator, REDIRECT_DELAY, ScheduledRedirect};
use crate::notify::{Notifier, TerminalNotifier, Toast};

pub use config::{ErrorCallback, ErrorHandlerConfig, HandleOptions};
pub use message::user_message;

/// Label used when the caller gives no context
pub const DEFAULT_CONTEXT: &str = "[Error]";

/// Logs, notifies and reacts to errors
#[derive(Clone)]
pub struct ErrorHandler {
    config: ErrorHandlerConfig,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(ErrorHandlerConfig::default())
    }
}

impl ErrorHandler {
    /// Handler that prints toasts to the terminal and cannot navigate
    pub fn new(config: ErrorHandlerConfig) -> Self {
        Self {
            config,
            notifier: Arc::new(TerminalNotifier::new(false)),
            navigator: Arc::new(NoopNavigator),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Handle an error with the handler's defaults
    pub fn report(&self, error: impl Into<CaughtError>, context: Option<&str>) -> Option<ScheduledRedirect> {
        self.handle(error, context, &HandleOptions::default())
    }

    /// Handle an error
    ///
    /// Returns the pending redirect when one was scheduled; callers that are
    /// about to exit can wait on it.
    pub fn handle(
        &self,
        error: impl Into<CaughtError>,
        context: Option<&str>,
        options: &HandleOptions,
    ) -> Option<ScheduledRedirect> {
        let error = error.into();
        let config = self.config.merged(options);

        if config.log_to_console {
            log_error(&error, context);
        }

        if config.show_toast {
            let toast = Toast::for_error(&error, user_message(&error));
            self.notifier.notify(&toast);
        }

        if let Some(callback) = &options.on_error {
            callback(&error);
        }

        if config.redirect_on_auth && error.requires_sign_in() {
            return ScheduledRedirect::schedule(self.navigator.clone(), LOGIN_ROUTE, REDIRECT_DELAY);
        }

        None
    }
}

/// Emit one grouped report for `error`
fn log_error(error: &CaughtError, context: Option<&str>) {
    let label = match context {
        Some(context) => format!("[{}]", context),
        None => DEFAULT_CONTEXT.to_string(),
    };
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let span = tracing::error_span!("error_report", context = %label, %timestamp);
    let _entered = span.enter();

    match error.as_app() {
        Some(app) => tracing::error!(
            name = %error.name(),
            status_code = app.status_code(),
            operational = app.is_operational(),
            "{}",
            error.message()
        ),
        None => tracing::error!(name = %error.name(), "{}", error.message()),
    }

    let mut cause = error.source();
    let mut depth = 1;
    while let Some(err) = cause {
        tracing::error!(depth, cause = %err, "caused by");
        cause = err.source();
        depth += 1;
    }
}
