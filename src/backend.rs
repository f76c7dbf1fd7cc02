//! The persistence seam. The view-state core never talks to storage directly;
//! the workspace goes through this trait.

use std::rc::Rc;
use thiserror::Error;

use crate::models::{Note, Task, TaskList};

/// A failed backend call. The message is shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Row-level storage keyed by owning user id.
pub trait Backend {
    fn select_tasks(&self, user_id: &str) -> Result<Vec<Task>, BackendError>;
    fn insert_task(&self, task: &Task) -> Result<(), BackendError>;
    fn update_task(&self, task: &Task) -> Result<(), BackendError>;
    fn delete_task(&self, user_id: &str, id: &str) -> Result<(), BackendError>;

    fn select_notes(&self, user_id: &str) -> Result<Vec<Note>, BackendError>;
    fn insert_note(&self, note: &Note) -> Result<(), BackendError>;
    fn update_note(&self, note: &Note) -> Result<(), BackendError>;
    fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError>;

    fn select_lists(&self, user_id: &str) -> Result<Vec<TaskList>, BackendError>;
    fn insert_list(&self, list: &TaskList) -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for Rc<B> {
    fn select_tasks(&self, user_id: &str) -> Result<Vec<Task>, BackendError> {
        (**self).select_tasks(user_id)
    }

    fn insert_task(&self, task: &Task) -> Result<(), BackendError> {
        (**self).insert_task(task)
    }

    fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        (**self).update_task(task)
    }

    fn delete_task(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        (**self).delete_task(user_id, id)
    }

    fn select_notes(&self, user_id: &str) -> Result<Vec<Note>, BackendError> {
        (**self).select_notes(user_id)
    }

    fn insert_note(&self, note: &Note) -> Result<(), BackendError> {
        (**self).insert_note(note)
    }

    fn update_note(&self, note: &Note) -> Result<(), BackendError> {
        (**self).update_note(note)
    }

    fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        (**self).delete_note(user_id, id)
    }

    fn select_lists(&self, user_id: &str) -> Result<Vec<TaskList>, BackendError> {
        (**self).select_lists(user_id)
    }

    fn insert_list(&self, list: &TaskList) -> Result<(), BackendError> {
        (**self).insert_list(list)
    }
}
