//! Toast notifications
//!
//! A [`Toast`] is what the error handler wants the user to see; a
//! [`Notifier`] decides where it goes. Delivery never fails from the
//! caller's point of view: backends log their own problems.

use colored::Colorize;
use notify_rust::Notification;

use crate::caught::CaughtError;

/// Icon used for client-side (4xx) problems
pub const WARNING_ICON: &str = "⚠️";

/// Visual severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Error,
    Warning,
}

/// A notification ready to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub style: ToastStyle,
    pub icon: Option<&'static str>,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: ToastStyle::Error,
            icon: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: ToastStyle::Warning,
            icon: Some(WARNING_ICON),
        }
    }

    /// Pick the style from the error's status code band
    ///
    /// Server errors and 401/403 are errors, other 4xx are warnings,
    /// anything else (including foreign errors) is an error.
    pub fn for_error(error: &CaughtError, message: impl Into<String>) -> Self {
        match error.as_app().map(|app| app.status_code()) {
            Some(status) if status >= 500 => Self::error(message),
            Some(401 | 403) => Self::error(message),
            Some(400..=499) => Self::warning(message),
            _ => Self::error(message),
        }
    }
}

/// Where toasts are delivered
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: &Toast);
}

/// Prints toasts to stderr
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    use_color: bool,
}

impl TerminalNotifier {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Render a toast as a single terminal line
    pub fn render(&self, toast: &Toast) -> String {
        let icon = toast.icon.unwrap_or("✗");
        let line = format!("{} {}", icon, toast.message);

        if !self.use_color {
            return line;
        }

        match toast.style {
            ToastStyle::Error => line.red().bold().to_string(),
            ToastStyle::Warning => line.yellow().to_string(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, toast: &Toast) {
        eprintln!("{}", self.render(toast));
    }
}

/// Shows toasts as desktop notifications
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn summary(&self, toast: &Toast) -> String {
        match toast.icon {
            Some(icon) => format!("{} {}", icon, self.app_name),
            None => self.app_name.clone(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, toast: &Toast) {
        if let Err(err) = Notification::new()
            .summary(&self.summary(toast))
            .body(&toast.message)
            .show()
        {
            tracing::warn!(error = %err, "desktop notification failed");
            eprintln!("{}", toast.message);
        }
    }
}
