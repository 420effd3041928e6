use clap::{Parser, Subcommand, ValueEnum};

use taskdeck_core::Priority;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Personal task manager with priorities and deadlines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Starts a session
    Login {
        /// Account email
        email: String,
    },

    /// Ends the current session
    Logout,

    /// Shows who is signed in
    Whoami,

    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Task priority
        #[arg(long, short = 'p', value_enum, default_value = "medium")]
        priority: PriorityArg,
        /// Deadline, e.g. "tomorrow", "friday", "in 3 days", "2026-01-25"
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
    },

    /// Lists tasks
    List {
        /// Show only open tasks
        #[arg(long, conflicts_with = "done")]
        open: bool,
        /// Show only completed tasks
        #[arg(long)]
        done: bool,
        /// Show only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// One line per task, no colors for deadlines
        #[arg(long, short = 'c')]
        compact: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Marks a task as completed
    Done { id: u32 },

    /// Marks a task as open again
    Undo { id: u32 },

    /// Edits a task
    Edit {
        id: u32,
        /// New title
        #[arg(long, short = 't')]
        title: Option<String>,
        /// New priority
        #[arg(long, short = 'p', value_enum)]
        priority: Option<PriorityArg>,
        /// New deadline, or "none" to clear it
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
    },

    /// Removes a task
    Remove {
        id: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

impl Commands {
    /// Label used when reporting a failure of this command
    pub fn context(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "Sign In",
            Commands::Logout => "Sign Out",
            Commands::Whoami => "Get User",
            Commands::Add { .. } => "Create Task",
            Commands::List { .. } => "Fetch Tasks",
            Commands::Done { .. } | Commands::Undo { .. } => "Toggle Task Complete",
            Commands::Edit { .. } => "Update Task",
            Commands::Remove { .. } => "Delete Task",
        }
    }

    /// Commands that should send the user back to sign in on auth errors
    pub fn redirects_on_auth(&self) -> bool {
        matches!(self, Commands::Whoami)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["taskdeck", "add", "Buy", "milk", "-p", "high", "--due", "tomorrow"])
            .unwrap();
        match cli.command {
            Commands::Add { title, priority, due } => {
                assert_eq!(title.join(" "), "Buy milk");
                assert_eq!(priority, PriorityArg::High);
                assert_eq!(due.as_deref(), Some("tomorrow"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_open_conflicts_with_done() {
        assert!(Cli::try_parse_from(["taskdeck", "list", "--open", "--done"]).is_err());
    }

    #[test]
    fn test_contexts() {
        let cli = Cli::try_parse_from(["taskdeck", "remove", "3"]).unwrap();
        assert_eq!(cli.command.context(), "Delete Task");
        assert!(!cli.command.redirects_on_auth());

        let cli = Cli::try_parse_from(["taskdeck", "list"]).unwrap();
        assert_eq!(cli.command.context(), "Fetch Tasks");
        assert!(!cli.command.redirects_on_auth());

        let cli = Cli::try_parse_from(["taskdeck", "whoami"]).unwrap();
        assert!(cli.command.redirects_on_auth());
    }
}
