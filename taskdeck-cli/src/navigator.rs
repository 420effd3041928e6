//! Terminal stand-in for page navigation
//!
//! A terminal has no pages, so navigating to a route prints the command that
//! gets the user there.

use colored::*;
use taskdeck_runtime::{LOGIN_ROUTE, Navigator};

#[derive(Debug, Clone, Copy)]
pub struct HintNavigator {
    use_color: bool,
}

impl HintNavigator {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn hint(route: &str) -> Option<&'static str> {
        match route {
            LOGIN_ROUTE => Some("Run `taskdeck login <email>` to sign in again."),
            _ => None,
        }
    }
}

impl Navigator for HintNavigator {
    fn navigate(&self, route: &str) {
        let Some(hint) = Self::hint(route) else {
            tracing::debug!(route, "no terminal hint for route");
            return;
        };

        if self.use_color {
            eprintln!("{}", hint.cyan());
        } else {
            eprintln!("{}", hint);
        }
    }
}
