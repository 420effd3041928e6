//! Task domain model
//!
//! Pure domain logic for task management with no I/O operations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Longest accepted task title, in characters
pub const MAX_TITLE_LEN: usize = 255;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            other => Err(AppError::invalid_input(format!(
                "Unknown priority '{}'. Use low, medium or high",
                other
            ))),
        }
    }
}

/// A single task
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Task {
    /// Create a new open task with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: 0,
            title: title.into(),
            completed: false,
            priority: Priority::default(),
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Check if the deadline has passed on an open task
    pub fn is_overdue(&self) -> bool {
        match self.deadline {
            Some(date) => !self.completed && date < Local::now().date_naive(),
            None => false,
        }
    }

    /// Apply a patch, bumping `updated_at`
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Local::now();
    }
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            deadline: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Check the input and return it with a trimmed title
    pub fn validated(mut self) -> Result<Self> {
        self.title = validate_title(&self.title)?;
        Ok(self)
    }
}

/// Partial update of a task. `deadline: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.priority.is_none() && self.deadline.is_none()
    }

    pub fn validated(mut self) -> Result<Self> {
        if self.is_empty() {
            return Err(AppError::validation(
                "At least one of title, priority or deadline must be provided",
            ));
        }
        if let Some(title) = self.title.take() {
            self.title = Some(validate_title(&title)?);
        }
        Ok(self)
    }
}

/// Validate a task title, returning it trimmed
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();

    let problem = if trimmed.is_empty() {
        Some("Task title is required")
    } else if trimmed.chars().count() > MAX_TITLE_LEN {
        Some("Task title is too long (max 255 characters)")
    } else if trimmed.chars().any(char::is_control) {
        Some("Task title cannot contain line breaks or control characters")
    } else {
        None
    };

    match problem {
        Some(message) => {
            let mut fields = BTreeMap::new();
            fields.insert("title".to_string(), message.to_string());
            Err(AppError::validation_with_fields(message, fields))
        }
        None => Ok(trimmed.to_string()),
    }
}

/// In-memory collection of tasks
///
/// Persistence is handled by storage adapters in consuming crates.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TaskCollection {
    pub tasks: HashMap<u32, Task>,
    pub next_id: u32,
}

impl TaskCollection {
    pub fn new() -> Self {
        TaskCollection {
            tasks: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add a task built from validated input, returning the stored task
    pub fn add(&mut self, input: NewTask) -> &Task {
        let id = self.find_next_id();
        let task = Task::new(input.title)
            .with_id(id)
            .with_priority(input.priority)
            .with_deadline(input.deadline);

        self.tasks.insert(id, task);
        self.update_next_id();
        &self.tasks[&id]
    }

    /// Add an existing task, keeping its ID
    pub fn insert(&mut self, task: Task) {
        if task.id >= self.next_id {
            self.next_id = task.id + 1;
        }
        self.tasks.insert(task.id, task);
    }

    /// Lowest unused ID (reuses gaps)
    fn find_next_id(&self) -> u32 {
        (1..=self.next_id)
            .find(|id| !self.tasks.contains_key(id))
            .unwrap_or(self.next_id)
    }

    fn update_next_id(&mut self) {
        self.next_id = self.tasks.keys().max().map_or(1, |max| max + 1);
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn get_mut_or_err(&mut self, id: u32) -> Result<&mut Task> {
        self.get_mut(id).ok_or_else(AppError::task_not_found)
    }

    /// Set the completion flag
    pub fn set_completed(&mut self, id: u32, completed: bool) -> Result<&Task> {
        let task = self.get_mut_or_err(id)?;
        task.completed = completed;
        task.touch();
        Ok(task)
    }

    pub fn remove(&mut self, id: u32) -> Option<Task> {
        self.tasks.remove(&id)
    }

    /// Find an open task with the same title, ignoring case
    pub fn find_open_by_title(&self, title: &str) -> Option<&Task> {
        let needle = title.trim().to_lowercase();
        self.tasks
            .values()
            .find(|t| !t.completed && t.title.to_lowercase() == needle)
    }

    /// All tasks sorted the way the dashboard shows them: open first, then
    /// by priority (high first), then by deadline, then by ID
    pub fn list_all(&self) -> Vec<&Task> {
        let mut list: Vec<&Task> = self.tasks.values().collect();
        list.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then(b.priority.cmp(&a.priority))
                .then(match (a.deadline, b.deadline) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then(a.id.cmp(&b.id))
        });
        list
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
