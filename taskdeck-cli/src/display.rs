//! Task display formatting module
//!
//! Handles colored output and the two list layouts

use chrono::{Local, NaiveDate};
use colored::*;

use taskdeck_core::deadline::describe_deadline;
use taskdeck_core::{Priority, Task};

/// Display mode for task list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayMode {
    /// Minimal one-line format
    Compact,
    /// Priority and deadline with status colors (default)
    Default,
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Format a task for display
pub fn format_task(task: &Task, mode: DisplayMode, use_color: bool) -> String {
    format_task_on(task, mode, use_color, Local::now().date_naive())
}

fn format_task_on(task: &Task, mode: DisplayMode, use_color: bool, today: NaiveDate) -> String {
    let checkbox = if task.completed { "[✓]" } else { "[ ]" };

    let title = if use_color && task.completed {
        task.title.green().to_string()
    } else {
        task.title.clone()
    };

    if mode == DisplayMode::Compact {
        return format!("{} [{}] {}", checkbox, task.id, title);
    }

    let id_str = if use_color {
        format!("[{}]", task.id).cyan().to_string()
    } else {
        format!("[{}]", task.id)
    };

    let priority = format_priority(task.priority, use_color);

    match task.deadline {
        Some(date) => {
            let due = format!("({})", describe_deadline(date, today));
            let diff_days = date.signed_duration_since(today).num_days();

            let due = if !use_color {
                due
            } else if task.completed {
                due.green().to_string()
            } else if diff_days < 0 {
                due.red().bold().to_string()
            } else if diff_days <= 1 {
                due.yellow().to_string()
            } else {
                due
            };

            format!("{} {} {} {} {}", checkbox, id_str, priority, title, due)
        }
        None => format!("{} {} {} {}", checkbox, id_str, priority, title),
    }
}

fn format_priority(priority: Priority, use_color: bool) -> String {
    let label = format!("{:<6}", priority.as_str());
    if !use_color {
        return label;
    }

    match priority {
        Priority::High => label.red().to_string(),
        Priority::Medium => label.yellow().to_string(),
        Priority::Low => label.dimmed().to_string(),
    }
}

/// Format a summary line for task list
pub fn format_summary(total: usize, completed: usize, overdue: usize, use_color: bool) -> String {
    let mut parts = vec![format!("{} total", total)];

    parts.push(if use_color {
        format!("{} done", completed).green().to_string()
    } else {
        format!("{} done", completed)
    });

    if overdue > 0 {
        parts.push(if use_color {
            format!("{} overdue", overdue).red().to_string()
        } else {
            format!("{} overdue", overdue)
        });
    }

    format!("[{}]", parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 21).unwrap()
    }

    #[test]
    fn test_format_task_compact() {
        let task = Task::new("Test task").with_id(1).with_priority(Priority::High);

        let output = format_task_on(&task, DisplayMode::Compact, false, today());
        assert_eq!(output, "[ ] [1] Test task");
    }

    #[test]
    fn test_format_task_with_deadline() {
        let task = Task::new("Pay rent")
            .with_id(3)
            .with_priority(Priority::High)
            .with_deadline(NaiveDate::from_ymd_opt(2026, 1, 22));

        let output = format_task_on(&task, DisplayMode::Default, false, today());
        assert_eq!(output, "[ ] [3] High   Pay rent (Tomorrow)");
    }

    #[test]
    fn test_format_task_completed() {
        let task = Task::new("Done task").with_id(2).with_completed(true);

        let output = format_task_on(&task, DisplayMode::Default, false, today());
        assert!(output.starts_with("[✓]"));
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(10, 5, 2, false);
        assert_eq!(summary, "[10 total | 5 done | 2 overdue]");
        assert_eq!(format_summary(3, 0, 0, false), "[3 total | 0 done]");
    }
}
