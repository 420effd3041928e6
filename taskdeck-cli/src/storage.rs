//! Markdown file storage for TaskCollection
//!
//! Tasks are grouped under one header per priority:
//!
//! ```text
//! ## High
//! [ID:1] - [ ] Send invoice (Due: 2026-01-25) <!-- created: ... updated: ... -->
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate};
use regex::Regex;
use tokio::fs;

use taskdeck_core::{Priority, Task, TaskCollection};

// Regex patterns are compile-time constants - invalid patterns are programming errors
static TASK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[ID:(\d+)\] - \[(.)\] (.*?)(?: \(Due: (\d{4}-\d{2}-\d{2})\))?(?: <!-- created: (\S+) updated: (\S+) -->)?$",
    )
    .expect("Invalid task regex pattern")
});

static PRIORITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(\w+)\s*$").expect("Invalid priority regex pattern"));

/// Markdown storage adapter
#[derive(Debug, Clone)]
pub struct MarkdownStorage {
    path: PathBuf,
}

impl MarkdownStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load tasks; a missing file is an empty collection
    pub async fn load(&self) -> io::Result<TaskCollection> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(parse_collection(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(TaskCollection::new()),
            Err(err) => Err(err),
        }
    }

    /// Save tasks, keeping a backup of the previous file
    pub async fn save(&self, collection: &TaskCollection) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.backup().await?;
        fs::write(&self.path, render_collection(collection)).await
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("md.bak")
    }

    /// Copy the current file next to itself
    pub async fn backup(&self) -> io::Result<()> {
        match fs::copy(&self.path, self.backup_path()).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

fn parse_collection(text: &str) -> TaskCollection {
    let mut collection = TaskCollection::new();
    let mut priority = Priority::default();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = PRIORITY_REGEX.captures(trimmed) {
            match caps[1].parse::<Priority>() {
                Ok(p) => priority = p,
                Err(_) => tracing::warn!(header = trimmed, "unknown priority header"),
            }
            continue;
        }

        match parse_task_line(trimmed, priority) {
            Some(task) => collection.insert(task),
            None => tracing::warn!(line = trimmed, "skipping invalid task line"),
        }
    }

    collection
}

fn render_collection(collection: &TaskCollection) -> String {
    let mut by_priority: BTreeMap<Priority, Vec<&Task>> = BTreeMap::new();
    for task in collection.list_all() {
        by_priority.entry(task.priority).or_default().push(task);
    }

    let mut out = String::new();
    for (priority, tasks) in by_priority.iter().rev() {
        if !out.is_empty() {
            out.push('\n');
        }

        let _ = writeln!(out, "## {}", priority);
        for task in tasks {
            let _ = writeln!(out, "{}", format_task_line(task));
        }
    }
    out
}

fn parse_task_line(line: &str, priority: Priority) -> Option<Task> {
    let caps = TASK_REGEX.captures(line)?;

    let id = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let completed = caps.get(2)?.as_str() == "x";
    let title = caps.get(3)?.as_str().trim();
    let deadline = caps
        .get(4)
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok());

    let mut task = Task::new(title)
        .with_id(id)
        .with_completed(completed)
        .with_priority(priority)
        .with_deadline(deadline);

    if let Some(created) = caps.get(5).and_then(|m| parse_timestamp(m.as_str())) {
        task.created_at = created;
    }
    if let Some(updated) = caps.get(6).and_then(|m| parse_timestamp(m.as_str())) {
        task.updated_at = updated;
    }

    Some(task)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

fn format_task_line(task: &Task) -> String {
    let check_mark = if task.completed { "x" } else { " " };
    let due = match task.deadline {
        Some(date) => format!(" (Due: {})", date.format("%Y-%m-%d")),
        None => String::new(),
    };

    format!(
        "[ID:{}] - [{}] {}{} <!-- created: {} updated: {} -->",
        task.id,
        check_mark,
        task.title,
        due,
        task.created_at.to_rfc3339(),
        task.updated_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::NewTask;

    #[test]
    fn test_parse_minimal_line() {
        let task = parse_task_line("[ID:1] - [ ] Simple task", Priority::Low).unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Simple task");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Low);
        assert!(task.deadline.is_none());
    }

    #[test]
    fn test_parse_full_line() {
        let line = "[ID:7] - [x] Send invoice (Due: 2026-01-25) <!-- created: 2026-01-20T09:00:00+00:00 updated: 2026-01-21T10:30:00+00:00 -->";
        let task = parse_task_line(line, Priority::High).unwrap();

        assert_eq!(task.id, 7);
        assert!(task.completed);
        assert_eq!(task.title, "Send invoice");
        assert_eq!(task.deadline, NaiveDate::from_ymd_opt(2026, 1, 25));
        assert_eq!(task.created_at.to_utc().to_rfc3339(), "2026-01-20T09:00:00+00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_task_line("- [ ] no id", Priority::Medium).is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_groups_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.md");
        let storage = MarkdownStorage::new(&path);

        let mut collection = TaskCollection::new();
        collection.add(NewTask::new("Low one").with_priority(Priority::Low));
        collection.add(
            NewTask::new("High one")
                .with_priority(Priority::High)
                .with_deadline(NaiveDate::from_ymd_opt(2026, 2, 1)),
        );
        storage.save(&collection).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let high_at = text.find("## High").unwrap();
        let low_at = text.find("## Low").unwrap();
        assert!(high_at < low_at);

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        let high = loaded.get(2).unwrap();
        assert_eq!(high.priority, Priority::High);
        assert_eq!(high.deadline, NaiveDate::from_ymd_opt(2026, 2, 1));
    }

    #[tokio::test]
    async fn test_second_save_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MarkdownStorage::new(dir.path().join("tasks.md"));

        let mut collection = TaskCollection::new();
        collection.add(NewTask::new("First"));
        storage.save(&collection).await.unwrap();
        collection.add(NewTask::new("Second"));
        storage.save(&collection).await.unwrap();

        let backup = std::fs::read_to_string(dir.path().join("tasks.md.bak")).unwrap();
        assert!(backup.contains("First"));
        assert!(!backup.contains("Second"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MarkdownStorage::new(dir.path().join("nope.md"));
        assert!(storage.load().await.unwrap().is_empty());
    }
}
