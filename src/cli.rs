use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

use crate::auth::{AuthError, SessionProvider};
use crate::backend::Backend;
use crate::draft::{NoteDraft, TaskDraft, ValidationError};
use crate::filter::TaskFilter;
use crate::markdown::{Document, html};
use crate::models::{Priority, Task};
use crate::partition::ListSelector;
use crate::stats::TaskStats;
use crate::tags::TagSet;
use crate::workspace::{Workspace, WorkspaceError};

#[derive(Parser)]
#[command(name = "chrononotes")]
#[command(about = "Tasks and markdown notes in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate dev config, database and session)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Quickly add a new task
    AddTask {
        /// Task title
        title: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// none, low, medium or high
        #[arg(long, default_value = "none")]
        priority: Priority,
        /// List id (defaults to inbox)
        #[arg(long)]
        list: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Quickly add a new note
    AddNote {
        /// Note title
        title: String,
        /// Markdown content
        #[arg(long)]
        content: Option<String>,
        /// Folder name
        #[arg(long)]
        folder: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Create a custom task list
    AddList {
        /// Display name; the id is derived from it
        name: String,
    },
    /// Print tasks
    Tasks {
        /// all, today, upcoming or completed
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        /// List id or smart list (inbox, next-7-days, important, planned, flagged)
        #[arg(long, default_value = "all")]
        list: String,
        /// Only tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
        /// Print summary numbers instead of tasks
        #[arg(long)]
        stats: bool,
    },
    /// Print a note by title
    ShowNote {
        /// Note title (case-insensitive)
        title: String,
        /// Render as HTML instead of markdown
        #[arg(long)]
        html: bool,
    },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in to an existing account
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Signout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Not signed in. Run `chrononotes signin` or `chrononotes signup` first")]
    NotSignedIn,
    #[error("No note titled '{0}'")]
    NoteNotFound(String),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle the add-task command
#[allow(clippy::too_many_arguments)]
pub fn handle_add_task<B: Backend>(
    workspace: &mut Workspace<B>,
    title: &str,
    description: Option<&str>,
    due: Option<&str>,
    priority: Priority,
    list: Option<&str>,
    tags: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let draft = TaskDraft::from_fields(title, description, due, priority, list, tags)?;
    let id = workspace.create_task(draft)?;
    writeln!(out, "Task created successfully (ID: {})", id)?;
    Ok(())
}

/// Handle the add-note command
pub fn handle_add_note<B: Backend>(
    workspace: &mut Workspace<B>,
    title: &str,
    content: Option<&str>,
    folder: Option<&str>,
    tags: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let draft = NoteDraft {
        title: title.to_string(),
        content: content.unwrap_or_default().to_string(),
        folder: folder.map(str::to_string),
        tags: tags.map(TagSet::parse).unwrap_or_default(),
    };
    let id = workspace.create_note(draft)?;
    writeln!(out, "Note created successfully (ID: {})", id)?;
    Ok(())
}

pub fn handle_add_list<B: Backend>(
    workspace: &mut Workspace<B>,
    name: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let list = workspace.create_list(name)?;
    writeln!(out, "List created successfully (ID: {})", list.id)?;
    Ok(())
}

/// Handle the tasks command: print the filtered tasks, or their stats
pub fn handle_tasks<B: Backend>(
    workspace: &mut Workspace<B>,
    filter: TaskFilter,
    list: &str,
    search: Option<&str>,
    stats: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    workspace.set_task_filter(filter);
    workspace.set_task_list(ListSelector::parse(list));
    workspace.set_task_search(search.unwrap_or_default().to_string());

    let snapshot = workspace.tasks().snapshot();
    if stats {
        let owned: Vec<Task> = snapshot.visible.iter().map(|t| (*t).clone()).collect();
        let stats = TaskStats::compute(&owned, snapshot.today);
        writeln!(out, "Total:      {}", stats.total)?;
        writeln!(out, "Completed:  {} ({}%)", stats.completed, stats.completion_rate)?;
        writeln!(out, "Pending:    {}", stats.pending)?;
        writeln!(out, "Due today:  {}", stats.due_today)?;
        writeln!(out, "Overdue:    {}", stats.overdue)?;
        for (priority, count) in stats.by_priority {
            writeln!(out, "  {:<8} {}", priority, count)?;
        }
        return Ok(());
    }

    if snapshot.visible.is_empty() {
        writeln!(out, "No tasks")?;
    }
    for task in &snapshot.visible {
        writeln!(out, "{}", format_task_line(task, workspace.list_name(&task.list_id)))?;
    }
    Ok(())
}

pub fn handle_show_note<B: Backend>(
    workspace: &Workspace<B>,
    title: &str,
    as_html: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let note = workspace
        .notes()
        .find_by_title(title)
        .ok_or_else(|| CliError::NoteNotFound(title.to_string()))?;
    if as_html {
        write!(out, "{}", html::to_html(&Document::parse(&note.content)))?;
    } else {
        writeln!(out, "{}", note.to_markdown())?;
    }
    Ok(())
}

pub fn handle_signup(
    auth: &mut impl SessionProvider,
    name: &str,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let user = auth.sign_up(name, email, password)?;
    writeln!(out, "Welcome, {}! You are signed in as {}", user.name, user.email)?;
    Ok(())
}

pub fn handle_signin(
    auth: &mut impl SessionProvider,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let user = auth.sign_in(email, password)?;
    writeln!(out, "Signed in as {}", user.email)?;
    Ok(())
}

pub fn handle_signout(auth: &mut impl SessionProvider, out: &mut impl Write) -> Result<(), CliError> {
    auth.sign_out()?;
    writeln!(out, "Signed out")?;
    Ok(())
}

pub fn handle_whoami(auth: &impl SessionProvider, out: &mut impl Write) -> Result<(), CliError> {
    let user = auth.current_user().ok_or(CliError::NotSignedIn)?;
    writeln!(out, "{} <{}>", user.name, user.email)?;
    Ok(())
}

/// One line per task: `[x] * Title (due 2025-04-10, high) [tag] @list`
pub fn format_task_line(task: &Task, list_name: &str) -> String {
    let mut line = format!(
        "[{}] {}{}",
        if task.completed { "x" } else { " " },
        if task.starred { "* " } else { "" },
        task.title
    );
    let mut details = Vec::new();
    if let Some(due) = task.due_date {
        details.push(format!("due {}", due.format("%Y-%m-%d")));
    }
    if task.priority != Priority::None {
        details.push(task.priority.to_string());
    }
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    if !task.tags.is_empty() {
        line.push(' ');
        line.push_str(&task.tags.format_brackets());
    }
    line.push_str(&format!(" @{}", list_name));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::models::User;
    use chrono::{NaiveDate, Utc};

    fn workspace() -> Workspace<Database> {
        let user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            created_at: Utc::now(),
        };
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        Workspace::open(Database::open_in_memory().unwrap(), user, today).unwrap()
    }

    #[test]
    fn add_task_then_list_today() {
        let mut ws = workspace();
        let mut out = Vec::new();
        handle_add_task(&mut ws, "Pay rent", None, Some("2025-04-10"), Priority::High, None, Some("home"), &mut out)
            .unwrap();
        handle_add_task(&mut ws, "Later", None, Some("2025-05-01"), Priority::None, None, None, &mut out).unwrap();

        let mut listing = Vec::new();
        handle_tasks(&mut ws, TaskFilter::Today, "all", None, false, &mut listing).unwrap();
        let listing = String::from_utf8(listing).unwrap();
        assert_eq!(listing, "[ ] Pay rent (due 2025-04-10, high) [home] @Inbox\n");
    }

    #[test]
    fn blank_title_never_reaches_database() {
        let mut ws = workspace();
        let mut out = Vec::new();
        let err = handle_add_task(&mut ws, "  ", None, None, Priority::None, None, None, &mut out).unwrap_err();
        assert!(matches!(err, CliError::Workspace(WorkspaceError::Validation(ValidationError::EmptyTitle))));
        assert!(ws.backend().get_tasks("u1").unwrap().is_empty());
    }

    #[test]
    fn task_added_by_list_name_shows_under_list_id() {
        let mut ws = workspace();
        let mut out = Vec::new();
        handle_add_list(&mut ws, "Work", &mut out).unwrap();
        handle_add_task(&mut ws, "Ship it", None, None, Priority::None, Some("Work"), None, &mut out).unwrap();

        let mut listing = Vec::new();
        handle_tasks(&mut ws, TaskFilter::All, "work", None, false, &mut listing).unwrap();
        assert_eq!(String::from_utf8(listing).unwrap(), "[ ] Ship it @Work\n");

        let err = handle_add_task(&mut ws, "Lost", None, None, Priority::None, Some("Someday"), None, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Workspace(WorkspaceError::Validation(ValidationError::UnknownList(_)))
        ));
    }

    #[test]
    fn selector_names_cannot_become_lists() {
        let mut ws = workspace();
        let mut out = Vec::new();
        for name in ["Important", "All"] {
            let err = handle_add_list(&mut ws, name, &mut out).unwrap_err();
            assert!(matches!(
                err,
                CliError::Workspace(WorkspaceError::Validation(ValidationError::ReservedListName(_)))
            ));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn show_note_as_html() {
        let mut ws = workspace();
        let mut out = Vec::new();
        handle_add_note(&mut ws, "Plan", Some("- [ ] ship"), None, None, &mut out).unwrap();
        let mut page = Vec::new();
        handle_show_note(&ws, "plan", true, &mut page).unwrap();
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("<input type=\"checkbox\" disabled> ship"));
    }

    #[test]
    fn stats_output() {
        let mut ws = workspace();
        let mut out = Vec::new();
        handle_add_task(&mut ws, "a", None, None, Priority::None, None, None, &mut out).unwrap();
        let mut report = Vec::new();
        handle_tasks(&mut ws, TaskFilter::All, "all", None, true, &mut report).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert!(report.starts_with("Total:      1\n"));
        assert!(report.contains("Completed:  0 (0%)"));
    }
}
