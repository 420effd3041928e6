//! User configuration, loaded with confy
//!
//! Every field has a default so a partial (or missing) config file works.

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use taskdeck_runtime::{DEFAULT_TIMEOUT, ErrorHandlerConfig, RetryOptions};

use crate::error::Result;

pub const APP_NAME: &str = "taskdeck";

/// Where error toasts are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    #[default]
    Terminal,
    Desktop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_directory: String,
    pub task_filename: String,
    pub session_filename: String,
    /// Lifetime of a session started with `login`
    pub session_ttl_hours: i64,
    /// Deadline for a single backend call
    pub request_timeout_secs: u64,
    pub notifications: NotificationBackend,
    pub color: bool,
    pub retry: RetryOptions,
    pub errors: ErrorHandlerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory().to_string_lossy().into_owned(),
            task_filename: "tasks.md".to_string(),
            session_filename: "session.json".to_string(),
            session_ttl_hours: 24 * 7,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            notifications: NotificationBackend::default(),
            color: true,
            retry: RetryOptions::default(),
            errors: ErrorHandlerConfig::default(),
        }
    }
}

impl Config {
    /// Load from the platform config directory, writing defaults on first run
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn tasks_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory).join(&self.task_filename)
    }

    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory).join(&self.session_filename)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session lifetime, `None` unless it is a positive, representable span
    pub fn session_ttl(&self) -> Option<TimeDelta> {
        TimeDelta::try_hours(self.session_ttl_hours).filter(|ttl| *ttl > TimeDelta::zero())
    }
}

fn default_data_directory() -> PathBuf {
    match ProjectDirs::from("", "", APP_NAME) {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(format!(".{}", APP_NAME)),
    }
}
