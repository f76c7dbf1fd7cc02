use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::markdown;
use crate::selection::{Identified, Patch};
use crate::tags::{TagSet, Tagged};

/// Built-in list every user has. New tasks land here unless told otherwise.
pub const INBOX_LIST_ID: &str = "inbox";

/// Maximum number of characters kept in a note excerpt.
pub const EXCERPT_LENGTH: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown priority '{0}' (expected none, low, medium or high)")]
pub struct ParsePriorityError(pub String);

impl Priority {
    /// Highest first, the order used for grouping and stats.
    pub const ALL: [Priority; 4] = [Priority::High, Priority::Medium, Priority::Low, Priority::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Cycle none -> low -> medium -> high -> none (used by the form).
    pub fn next(self) -> Self {
        match self {
            Priority::None => Priority::Low,
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub list_id: String,
    pub tags: TagSet,
    pub starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh task with a client-assigned id, filed in the inbox.
    pub fn new(user_id: &str, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            description: None,
            completed: false,
            due_date: None,
            priority: Priority::None,
            list_id: INBOX_LIST_ID.to_string(),
            tags: TagSet::new(),
            starred: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Render as a markdown checklist entry, used for clipboard export.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("- [{}] {}", if self.completed { "x" } else { " " }, self.title);
        if let Some(due) = self.due_date {
            out.push_str(&format!(" (due {})", due.format("%Y-%m-%d")));
        }
        if !self.tags.is_empty() {
            out.push(' ');
            out.push_str(&self.tags.format_hashes());
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            for line in description.lines() {
                out.push_str("\n  ");
                out.push_str(line);
            }
        }
        out
    }
}

impl Identified for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Tagged for Task {
    fn tags(&self) -> &TagSet {
        &self.tags
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: TagSet,
    pub folder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(user_id: &str, title: String, content: String) -> Self {
        let now = Utc::now();
        let excerpt = markdown::excerpt(&content, EXCERPT_LENGTH);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            content,
            excerpt,
            tags: TagSet::new(),
            folder: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the content and re-derive the excerpt.
    pub fn set_content(&mut self, content: String) {
        self.excerpt = markdown::excerpt(&content, EXCERPT_LENGTH);
        self.content = content;
    }

    /// Folder name for grouping; notes without one are "Unfiled".
    pub fn folder_name(&self) -> &str {
        self.folder.as_deref().unwrap_or(UNFILED_FOLDER)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        if !self.tags.is_empty() {
            out.push_str(&format!("\n{}\n", self.tags.format_hashes()));
        }
        if !self.content.is_empty() {
            out.push('\n');
            out.push_str(&self.content);
        }
        out
    }
}

/// Group name used for notes without a folder.
pub const UNFILED_FOLDER: &str = "Unfiled";

impl Identified for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Tagged for Note {
    fn tags(&self) -> &TagSet {
        &self.tags
    }
}

/// A user-defined list a task can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TaskList {
    /// The id is a slug of the name, e.g. "Grocery Run" -> "grocery-run".
    pub fn new(user_id: &str, name: &str) -> Self {
        Self {
            id: slugify(name),
            user_id: user_id.to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn inbox(user_id: &str) -> Self {
        Self {
            id: INBOX_LIST_ID.to_string(),
            user_id: user_id.to_string(),
            name: "Inbox".to_string(),
            created_at: Utc::now(),
        }
    }
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// A signed-up user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Field-level changes to a task. `None` leaves the field untouched; for
/// optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub list_id: Option<String>,
    pub tags: Option<TagSet>,
    pub starred: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

impl Patch<Task> for TaskPatch {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(list_id) = self.list_id {
            task.list_id = list_id;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(starred) = self.starred {
            task.starred = starred;
        }
        task.touch();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagSet>,
    pub folder: Option<Option<String>>,
}

impl Patch<Note> for NotePatch {
    fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.set_content(content);
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(folder) = self.folder {
            note.folder = folder;
        }
        note.touch();
    }
}
