use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use taskdeck_core::deadline::parse_deadline;
use taskdeck_core::{AppError, NewTask, Task, TaskPatch};
use taskdeck_runtime::{
    CaughtError, DesktopNotifier, ErrorHandler, HandleOptions, Notifier, TerminalNotifier, safe_async,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::backend::LocalBackend;
use crate::cli::{Cli, Commands};
use crate::config::{Config, NotificationBackend};
use crate::display::{DisplayMode, format_summary, format_task, supports_color};
use crate::navigator::HintNavigator;
use crate::service::TaskService;
use crate::session::{Session, SessionStore};
use crate::storage::MarkdownStorage;

mod backend;
mod cli;
mod config;
mod display;
mod error;
mod navigator;
mod service;
mod session;
mod storage;

#[tokio::main]
async fn main() -> error::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = Config::load()?;
    let handler = build_handler(&cfg);

    let context = cli.command.context();
    let options = HandleOptions::new().redirect_on_auth(cli.command.redirects_on_auth());

    match run(cli.command, &cfg).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            if let Some(redirect) = handler.handle(err, Some(context), &options) {
                redirect.wait().await;
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}

fn build_handler(cfg: &Config) -> ErrorHandler {
    let use_color = cfg.color && atty::is(atty::Stream::Stderr);

    let notifier: Arc<dyn Notifier> = match cfg.notifications {
        NotificationBackend::Terminal => Arc::new(TerminalNotifier::new(use_color)),
        NotificationBackend::Desktop => Arc::new(DesktopNotifier::new("Taskdeck")),
    };

    ErrorHandler::new(cfg.errors)
        .with_notifier(notifier)
        .with_navigator(Arc::new(HintNavigator::new(use_color)))
}

async fn run(command: Commands, cfg: &Config) -> Result<(), CaughtError> {
    let sessions = SessionStore::new(cfg.session_path());
    let backend = LocalBackend::new(MarkdownStorage::new(cfg.tasks_path()), sessions.clone());
    let service = TaskService::new(Arc::new(backend), cfg.retry, cfg.request_timeout());

    match command {
        Commands::Login { email } => {
            let email = email.trim();
            if !email.contains('@') {
                return Err(AppError::invalid_input("Please enter a valid email address").into());
            }

            let session = cfg
                .session_ttl()
                .and_then(|ttl| Session::start(email, ttl))
                .ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "session_ttl_hours = {} is out of range in the config file",
                        cfg.session_ttl_hours
                    ))
                })?;
            sessions.save(&session).await?;
            println!("Signed in as {}", email);
        }

        Commands::Logout => {
            let (_, email) = safe_async(service.current_user()).await;
            if sessions.clear().await? {
                match email {
                    Some(email) => println!("Signed out {}", email),
                    None => println!("Signed out."),
                }
            } else {
                println!("Not signed in.");
            }
        }

        Commands::Whoami => {
            println!("{}", service.current_user().await?);
        }

        Commands::Add {
            title,
            priority,
            due,
        } => {
            let deadline = due.as_deref().map(parse_deadline).transpose()?;
            let input = NewTask::new(title.join(" "))
                .with_priority(priority.into())
                .with_deadline(deadline);

            let task = service.create(input).await?;
            println!("Added task #{}: {}", task.id, task.title);
        }

        Commands::List {
            open,
            done,
            overdue,
            compact,
            no_color,
        } => {
            let tasks = service.list().await?;
            let use_color = cfg.color && !no_color && supports_color();
            let mode = if compact {
                DisplayMode::Compact
            } else {
                DisplayMode::Default
            };

            let shown: Vec<&Task> = tasks
                .iter()
                .filter(|t| !open || !t.completed)
                .filter(|t| !done || t.completed)
                .filter(|t| !overdue || t.is_overdue())
                .collect();

            if shown.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &shown {
                    println!("{}", format_task(task, mode, use_color));
                }
            }

            let completed = tasks.iter().filter(|t| t.completed).count();
            let overdue_count = tasks.iter().filter(|t| t.is_overdue()).count();
            println!();
            println!(
                "{}",
                format_summary(tasks.len(), completed, overdue_count, use_color)
            );
        }

        Commands::Done { id } => {
            let task = service.set_completed(id, true).await?;
            println!("Completed: {}", task.title);
        }

        Commands::Undo { id } => {
            let task = service.set_completed(id, false).await?;
            println!("Reopened: {}", task.title);
        }

        Commands::Edit {
            id,
            title,
            priority,
            due,
        } => {
            let deadline = match due.as_deref().map(str::trim) {
                None => None,
                Some(raw) if raw.eq_ignore_ascii_case("none") => Some(None),
                Some(raw) => Some(Some(parse_deadline(raw)?)),
            };
            let patch = TaskPatch {
                title,
                priority: priority.map(Into::into),
                deadline,
            };

            let task = service.update(id, patch).await?;
            println!("Updated task #{}: {}", task.id, task.title);
        }

        Commands::Remove { id, force } => {
            if !force && !confirm(&format!("Remove task #{}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }

            let task = service.delete(id).await?;
            println!("Removed: {}", task.title);
        }
    }

    Ok(())
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
