//! Error handler settings and per-call overrides

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::caught::CaughtError;

/// Callback run for every handled error
pub type ErrorCallback = Arc<dyn Fn(&CaughtError) + Send + Sync>;

/// Default behavior of the error handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandlerConfig {
    /// Present a notification to the user
    pub show_toast: bool,
    /// Emit the grouped diagnostic log
    pub log_to_console: bool,
    /// Send the user to the login entry point on auth errors
    pub redirect_on_auth: bool,
}

impl Default for ErrorHandlerConfig {
    fn default() -> Self {
        Self {
            show_toast: true,
            log_to_console: true,
            redirect_on_auth: false,
        }
    }
}

impl ErrorHandlerConfig {
    /// Overlay per-call options on these defaults
    pub fn merged(self, options: &HandleOptions) -> Self {
        Self {
            show_toast: options.show_toast.unwrap_or(self.show_toast),
            log_to_console: options.log_to_console.unwrap_or(self.log_to_console),
            redirect_on_auth: options.redirect_on_auth.unwrap_or(self.redirect_on_auth),
        }
    }
}

/// Per-call overrides; unset fields keep the handler's defaults
#[derive(Clone, Default)]
pub struct HandleOptions {
    pub show_toast: Option<bool>,
    pub log_to_console: Option<bool>,
    pub redirect_on_auth: Option<bool>,
    pub on_error: Option<ErrorCallback>,
}

impl HandleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_toast(mut self, show: bool) -> Self {
        self.show_toast = Some(show);
        self
    }

    pub fn log_to_console(mut self, log: bool) -> Self {
        self.log_to_console = Some(log);
        self
    }

    pub fn redirect_on_auth(mut self, redirect: bool) -> Self {
        self.redirect_on_auth = Some(redirect);
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&CaughtError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for HandleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleOptions")
            .field("show_toast", &self.show_toast)
            .field("log_to_console", &self.log_to_console)
            .field("redirect_on_auth", &self.redirect_on_auth)
            .field("on_error", &self.on_error.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ErrorHandlerConfig::default();
        assert!(config.show_toast);
        assert!(config.log_to_console);
        assert!(!config.redirect_on_auth);
    }

    #[test]
    fn test_merge_only_overrides_set_fields() {
        let base = ErrorHandlerConfig::default();
        let merged = base.merged(&HandleOptions::new().redirect_on_auth(true).show_toast(false));

        assert!(!merged.show_toast);
        assert!(merged.log_to_console);
        assert!(merged.redirect_on_auth);
        // defaults are copied, never mutated
        assert_eq!(base, ErrorHandlerConfig::default());
    }

    #[test]
    fn test_partial_config_file() {
        let config: ErrorHandlerConfig =
            serde_json::from_str(r#"{"redirect_on_auth":true}"#).unwrap();
        assert!(config.redirect_on_auth);
        assert!(config.show_toast);
    }
}
