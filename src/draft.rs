//! User input for new tasks and notes, validated before anything is sent to
//! the backend.

use chrono::NaiveDate;
use thiserror::Error;

use crate::filter::SmartList;
use crate::models::{INBOX_LIST_ID, Note, Priority, Task, slugify};
use crate::partition::ALL_LISTS_KEY;
use crate::tags::TagSet;
use crate::utils::parse_date;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("List name must contain a letter or digit")]
    InvalidListName,
    #[error("List name '{0}' is reserved")]
    ReservedListName(String),
    #[error("No list named '{0}'")]
    UnknownList(String),
    #[error("Tag cannot be empty")]
    EmptyTag,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub list_id: Option<String>,
    pub tags: TagSet,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Build a draft from raw text fields (CLI flags, form inputs).
    pub fn from_fields(
        title: &str,
        description: Option<&str>,
        due: Option<&str>,
        priority: Priority,
        list_id: Option<&str>,
        tags: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let due_date = match due.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(parse_date(raw).map_err(|_| ValidationError::InvalidDate(raw.to_string()))?),
            None => None,
        };
        Ok(Self {
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            due_date,
            priority,
            list_id: list_id
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            tags: tags.map(TagSet::parse).unwrap_or_default(),
        })
    }

    /// Check the draft and turn it into a task owned by `user_id`.
    pub fn into_task(self, user_id: &str) -> Result<Task, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let mut task = Task::new(user_id, title.to_string());
        task.description = self.description;
        task.due_date = self.due_date;
        task.priority = self.priority;
        task.list_id = self.list_id.unwrap_or_else(|| INBOX_LIST_ID.to_string());
        task.tags = self.tags;
        Ok(task)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub folder: Option<String>,
    pub tags: TagSet,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn into_note(self, user_id: &str) -> Result<Note, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let mut note = Note::new(user_id, title.to_string(), self.content);
        note.folder = self
            .folder
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        note.tags = self.tags;
        Ok(note)
    }
}

/// A list name must slug to a non-empty id that is not taken by the `all`
/// selector or a smart list.
pub fn validate_list_name(name: &str) -> Result<(), ValidationError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ValidationError::InvalidListName);
    }
    if slug == ALL_LISTS_KEY || SmartList::from_key(&slug).is_some() {
        return Err(ValidationError::ReservedListName(name.trim().to_string()));
    }
    Ok(())
}

pub fn validate_tag(tag: &str) -> Result<&str, ValidationError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(ValidationError::EmptyTag);
    }
    Ok(tag)
}
