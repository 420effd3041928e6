//! Delayed navigation after authentication failures

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Login entry point
pub const LOGIN_ROUTE: &str = "/login";

/// Time the user gets to read the toast before being sent away
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Moves the user to another entry point of the application
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for hosts with nowhere to go
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "navigation requested but not supported");
    }
}

/// A navigation that fires after [`REDIRECT_DELAY`]
///
/// Dropping the handle does not cancel the redirect.
#[derive(Debug)]
pub struct ScheduledRedirect {
    handle: JoinHandle<()>,
}

impl ScheduledRedirect {
    /// Spawn the delayed navigation on the current Tokio runtime
    ///
    /// Returns `None` when called outside a runtime.
    pub fn schedule(navigator: Arc<dyn Navigator>, route: &'static str, delay: Duration) -> Option<Self> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::warn!(error = %err, route, "no async runtime, skipping redirect");
                return None;
            }
        };

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(route, "redirecting");
            navigator.navigate(route);
        });
        Some(Self { handle })
    }

    /// Wait until the navigation has happened
    pub async fn wait(self) {
        if let Err(err) = self.handle.await {
            tracing::warn!(error = %err, "redirect task did not complete");
        }
    }
}
