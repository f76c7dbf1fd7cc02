//! One signed-in user's tasks, notes and lists, kept in view-state containers
//! and written through to a [`Backend`].
//!
//! Writes are optimistic: the view changes first, then the backend is called.
//! A rejected insert is rolled back; a rejected update or delete triggers a
//! refresh so the view matches storage again.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{Backend, BackendError};
use crate::draft::{NoteDraft, TaskDraft, ValidationError, validate_list_name, validate_tag};
use crate::filter::TaskFilter;
use crate::models::{NotePatch, TaskList, TaskPatch, User, slugify};
use crate::partition::ListSelector;
use crate::selection::SelectionError;
use crate::state::{NoteAction, NoteView, TaskAction, TaskView};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Nothing is selected")]
    NoSelection,
    #[error("A list with id {0} already exists")]
    DuplicateList(String),
}

impl WorkspaceError {
    /// Validation errors never reached the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkspaceError::Validation(_) | WorkspaceError::DuplicateList(_))
    }
}

pub struct Workspace<B: Backend> {
    backend: B,
    user: User,
    tasks: TaskView,
    notes: NoteView,
    lists: Vec<TaskList>,
}

impl<B: Backend> Workspace<B> {
    /// An empty workspace; call [`Workspace::refresh`] to load data.
    pub fn new(backend: B, user: User, today: NaiveDate) -> Self {
        let lists = vec![TaskList::inbox(&user.id)];
        Self {
            backend,
            user,
            tasks: TaskView::new(today),
            notes: NoteView::new(),
            lists,
        }
    }

    /// Create a workspace and load everything the user owns.
    pub fn open(backend: B, user: User, today: NaiveDate) -> Result<Self, WorkspaceError> {
        let mut workspace = Self::new(backend, user, today);
        workspace.refresh()?;
        Ok(workspace)
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn tasks(&self) -> &TaskView {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteView {
        &self.notes
    }

    /// The inbox followed by the user's custom lists.
    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// View-only task actions (selection, filter, list, search). Data changes
    /// go through the dedicated methods so they are persisted.
    pub fn dispatch_tasks(&mut self, action: TaskAction) -> Result<(), WorkspaceError> {
        Ok(self.tasks.dispatch(action)?)
    }

    pub fn dispatch_notes(&mut self, action: NoteAction) -> Result<(), WorkspaceError> {
        Ok(self.notes.dispatch(action)?)
    }

    pub fn set_task_filter(&mut self, filter: TaskFilter) {
        self.tasks.set_filter(filter);
    }

    pub fn set_task_list(&mut self, list: ListSelector) {
        self.tasks.set_list(list);
    }

    pub fn set_task_search(&mut self, query: String) {
        self.tasks.set_search(query);
    }

    pub fn set_note_folder(&mut self, folder: Option<String>) {
        self.notes.set_folder(folder);
    }

    pub fn set_note_tag(&mut self, tag: Option<String>) {
        self.notes.set_tag(tag);
    }

    pub fn set_note_search(&mut self, query: String) {
        self.notes.set_search(query);
    }

    /// Drop both selections, e.g. when the user moves to another view.
    pub fn clear_selections(&mut self) {
        self.tasks.clear_selection();
        self.notes.clear_selection();
    }

    /// Re-fetch tasks, notes and lists, replacing the in-memory collections.
    pub fn refresh(&mut self) -> Result<(), WorkspaceError> {
        let user_id = self.user.id.clone();
        let tasks = self.backend.select_tasks(&user_id)?;
        let notes = self.backend.select_notes(&user_id)?;
        let custom = self.backend.select_lists(&user_id)?;
        info!(tasks = tasks.len(), notes = notes.len(), lists = custom.len(), "workspace refreshed");

        self.tasks.dispatch(TaskAction::Loaded(tasks))?;
        self.notes.dispatch(NoteAction::Loaded(notes))?;
        self.lists = std::iter::once(TaskList::inbox(&user_id))
            .chain(custom.into_iter().filter(|list| list.id != crate::models::INBOX_LIST_ID))
            .collect();
        Ok(())
    }

    /// Move the view to a new calendar day (midnight rollover).
    pub fn set_today(&mut self, today: NaiveDate) {
        if self.tasks.today() != today {
            self.tasks.set_today(today);
        }
    }

    pub fn create_task(&mut self, mut draft: TaskDraft) -> Result<String, WorkspaceError> {
        if let Some(key) = draft.list_id.take() {
            draft.list_id = Some(self.resolve_list_id(&key)?);
        }
        let task = draft.into_task(&self.user.id)?;
        let id = task.id.clone();
        self.tasks.dispatch(TaskAction::Inserted(task.clone()))?;
        if let Err(err) = self.backend.insert_task(&task) {
            warn!(id = %id, error = %err, "task insert rejected, rolling back");
            self.tasks.dispatch(TaskAction::Removed(id))?;
            return Err(err.into());
        }
        info!(id = %id, "task created");
        Ok(id)
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<(), WorkspaceError> {
        self.tasks.dispatch(TaskAction::ToggleCompleted(id.to_string()))?;
        self.persist_task(id)
    }

    pub fn toggle_starred(&mut self, id: &str) -> Result<(), WorkspaceError> {
        self.tasks.dispatch(TaskAction::ToggleStarred(id.to_string()))?;
        self.persist_task(id)
    }

    pub fn update_task(&mut self, id: &str, mut patch: TaskPatch) -> Result<(), WorkspaceError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle.into());
            }
        }
        if let Some(key) = patch.list_id.take() {
            patch.list_id = Some(self.resolve_list_id(&key)?);
        }
        self.tasks.dispatch(TaskAction::Update {
            id: id.to_string(),
            patch,
        })?;
        self.persist_task(id)
    }

    /// Merge a patch into the selected task.
    pub fn update_selected_task(&mut self, patch: TaskPatch) -> Result<(), WorkspaceError> {
        let id = self.selected_task_id()?;
        self.update_task(&id, patch)
    }

    pub fn add_task_tag(&mut self, id: &str, tag: &str) -> Result<(), WorkspaceError> {
        let tag = validate_tag(tag)?;
        self.tasks.dispatch(TaskAction::AddTag {
            id: id.to_string(),
            tag: tag.to_string(),
        })?;
        self.persist_task(id)
    }

    pub fn remove_task_tag(&mut self, id: &str, tag: &str) -> Result<(), WorkspaceError> {
        self.tasks.dispatch(TaskAction::RemoveTag {
            id: id.to_string(),
            tag: tag.to_string(),
        })?;
        self.persist_task(id)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if self.tasks.get(id).is_none() {
            return Err(SelectionError::NotFound(id.to_string()).into());
        }
        self.tasks.dispatch(TaskAction::Removed(id.to_string()))?;
        if let Err(err) = self.backend.delete_task(&self.user.id, id) {
            return Err(self.recover(err));
        }
        info!(id, "task deleted");
        Ok(())
    }

    pub fn selected_task_id(&self) -> Result<String, WorkspaceError> {
        self.tasks
            .selected()
            .map(|task| task.id.clone())
            .ok_or(WorkspaceError::NoSelection)
    }

    pub fn create_note(&mut self, draft: NoteDraft) -> Result<String, WorkspaceError> {
        let note = draft.into_note(&self.user.id)?;
        let id = note.id.clone();
        self.notes.dispatch(NoteAction::Inserted(note.clone()))?;
        if let Err(err) = self.backend.insert_note(&note) {
            warn!(id = %id, error = %err, "note insert rejected, rolling back");
            self.notes.dispatch(NoteAction::Removed(id))?;
            return Err(err.into());
        }
        info!(id = %id, "note created");
        Ok(id)
    }

    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> Result<(), WorkspaceError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle.into());
            }
        }
        self.notes.dispatch(NoteAction::Update {
            id: id.to_string(),
            patch,
        })?;
        self.persist_note(id)
    }

    pub fn update_selected_note(&mut self, patch: NotePatch) -> Result<(), WorkspaceError> {
        let id = self.selected_note_id()?;
        self.update_note(&id, patch)
    }

    pub fn add_note_tag(&mut self, id: &str, tag: &str) -> Result<(), WorkspaceError> {
        let tag = validate_tag(tag)?;
        self.notes.dispatch(NoteAction::AddTag {
            id: id.to_string(),
            tag: tag.to_string(),
        })?;
        self.persist_note(id)
    }

    pub fn remove_note_tag(&mut self, id: &str, tag: &str) -> Result<(), WorkspaceError> {
        self.notes.dispatch(NoteAction::RemoveTag {
            id: id.to_string(),
            tag: tag.to_string(),
        })?;
        self.persist_note(id)
    }

    pub fn delete_note(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if self.notes.get(id).is_none() {
            return Err(SelectionError::NotFound(id.to_string()).into());
        }
        self.notes.dispatch(NoteAction::Removed(id.to_string()))?;
        if let Err(err) = self.backend.delete_note(&self.user.id, id) {
            return Err(self.recover(err));
        }
        info!(id, "note deleted");
        Ok(())
    }

    pub fn selected_note_id(&self) -> Result<String, WorkspaceError> {
        self.notes
            .selected()
            .map(|note| note.id.clone())
            .ok_or(WorkspaceError::NoSelection)
    }

    pub fn create_list(&mut self, name: &str) -> Result<TaskList, WorkspaceError> {
        validate_list_name(name)?;
        let list = TaskList::new(&self.user.id, name);
        if self.lists.iter().any(|existing| existing.id == list.id) {
            return Err(WorkspaceError::DuplicateList(list.id));
        }
        self.backend.insert_list(&list)?;
        info!(id = %list.id, "list created");
        self.lists.push(list.clone());
        Ok(list)
    }

    /// Accept a list id or a list name ("Work" finds the list `work`).
    pub fn resolve_list_id(&self, key: &str) -> Result<String, ValidationError> {
        let key = key.trim();
        let slug = slugify(key);
        self.lists
            .iter()
            .find(|list| list.id == key || list.id == slug)
            .map(|list| list.id.clone())
            .ok_or_else(|| ValidationError::UnknownList(key.to_string()))
    }

    /// Display name of a list id, falling back to the id itself.
    pub fn list_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.lists
            .iter()
            .find(|list| list.id == id)
            .map(|list| list.name.as_str())
            .unwrap_or(id)
    }

    fn persist_task(&mut self, id: &str) -> Result<(), WorkspaceError> {
        let Some(task) = self.tasks.get(id).cloned() else {
            return Err(SelectionError::NotFound(id.to_string()).into());
        };
        match self.backend.update_task(&task) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.recover(err)),
        }
    }

    fn persist_note(&mut self, id: &str) -> Result<(), WorkspaceError> {
        let Some(note) = self.notes.get(id).cloned() else {
            return Err(SelectionError::NotFound(id.to_string()).into());
        };
        match self.backend.update_note(&note) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.recover(err)),
        }
    }

    /// After a rejected write, reload from the backend so the view shows what
    /// is actually stored. The original error is what gets reported.
    fn recover(&mut self, err: BackendError) -> WorkspaceError {
        warn!(error = %err, "write rejected, refreshing from backend");
        if let Err(refresh_err) = self.refresh() {
            warn!(error = %refresh_err, "refresh after rejected write failed");
        }
        err.into()
    }
}
