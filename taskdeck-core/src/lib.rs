//! Taskdeck Core - error taxonomy and task domain logic
//!
//! This crate contains no I/O and no async runtime. Backend failures are
//! classified here; retrying and presenting them is left to
//! `taskdeck-runtime`.

pub mod classify;
pub mod deadline;
pub mod error;
pub mod task;

pub use classify::{AlwaysOnline, Connectivity, NetworkFailure, RawBackendError, classify, classify_network};
pub use error::{AppError, ErrorKind, Result};
pub use task::{NewTask, Priority, Task, TaskCollection, TaskPatch};
