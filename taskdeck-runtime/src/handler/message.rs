//! User-facing copy for handled errors

use crate::caught::CaughtError;

pub const FETCH_FAILED: &str = "Network error. Please check your connection and try again.";
pub const TIMED_OUT: &str = "Request timed out. Please try again.";
pub const NETWORK_FAILED: &str = "Network error. Please check your internet connection.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const NO_PERMISSION: &str = "You do not have permission to perform this action.";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Message to show the user for `error`
///
/// Taxonomy members already carry user-facing text. Anything else is matched
/// against known fragments, first match wins.
pub fn user_message(error: &CaughtError) -> String {
    if let Some(app) = error.as_app() {
        return app.message().to_string();
    }

    let lowered = error.message().to_lowercase();
    let has = |fragment: &str| lowered.contains(fragment);

    let copy = if has("fetch") {
        FETCH_FAILED
    } else if has("timeout") {
        TIMED_OUT
    } else if has("network") {
        NETWORK_FAILED
    } else if has("jwt") || has("token") {
        SESSION_EXPIRED
    } else if has("not found") {
        NOT_FOUND
    } else if has("permission") || has("unauthorized") {
        NO_PERMISSION
    } else {
        UNEXPECTED
    };
    copy.to_string()
}
