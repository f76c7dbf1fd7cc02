//! View-state containers for the task and note views.
//!
//! Each view owns its collection, its active filter/list/folder, the search
//! query and the selection. All mutation goes through `dispatch`; readers take
//! a `snapshot` that holds the derived visible items.

use chrono::NaiveDate;
use tracing::debug;

use crate::filter::{TaskFilter, filter_tasks, note_matches_search, task_matches_search};
use crate::models::{Note, NotePatch, Task, TaskPatch};
use crate::partition::{ListSelector, partition_by_list};
use crate::selection::{SelectionError, SelectionState};

#[derive(Debug, Clone)]
pub enum TaskAction {
    /// A completed fetch replaced the whole collection.
    Loaded(Vec<Task>),
    Inserted(Task),
    Removed(String),
    Select(String),
    ClearSelection,
    SetFilter(TaskFilter),
    SetList(ListSelector),
    SetSearch(String),
    SetToday(NaiveDate),
    ToggleCompleted(String),
    ToggleStarred(String),
    Update { id: String, patch: TaskPatch },
    AddTag { id: String, tag: String },
    RemoveTag { id: String, tag: String },
}

#[derive(Debug, Clone)]
pub struct TaskView {
    tasks: SelectionState<Task>,
    filter: TaskFilter,
    list: ListSelector,
    search: String,
    today: NaiveDate,
}

/// Read-only view of a [`TaskView`] at one point in time.
#[derive(Debug)]
pub struct TaskSnapshot<'a> {
    pub visible: Vec<&'a Task>,
    pub selected: Option<&'a Task>,
    pub filter: TaskFilter,
    pub list: &'a ListSelector,
    pub search: &'a str,
    pub today: NaiveDate,
    pub total: usize,
}

impl TaskView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            tasks: SelectionState::new(),
            filter: TaskFilter::All,
            list: ListSelector::All,
            search: String::new(),
            today,
        }
    }

    pub fn dispatch(&mut self, action: TaskAction) -> Result<(), SelectionError> {
        debug!(?action, "task view action");
        match action {
            TaskAction::Loaded(tasks) => self.tasks.replace_all(tasks),
            TaskAction::Inserted(task) => self.tasks.insert(task)?,
            TaskAction::Removed(id) => {
                self.tasks.remove(&id);
            }
            TaskAction::Select(id) => {
                self.tasks.select(&id)?;
            }
            TaskAction::ClearSelection => self.clear_selection(),
            TaskAction::SetFilter(filter) => self.set_filter(filter),
            TaskAction::SetList(list) => self.set_list(list),
            TaskAction::SetSearch(query) => self.set_search(query),
            TaskAction::SetToday(today) => self.today = today,
            TaskAction::ToggleCompleted(id) => {
                self.tasks.modify(&id, |task| {
                    task.completed = !task.completed;
                    task.touch();
                })?;
            }
            TaskAction::ToggleStarred(id) => {
                self.tasks.modify(&id, |task| {
                    task.starred = !task.starred;
                    task.touch();
                })?;
            }
            TaskAction::Update { id, patch } => {
                self.tasks.update(&id, patch)?;
            }
            TaskAction::AddTag { id, tag } => {
                self.tasks.modify(&id, |task| {
                    if task.tags.insert(&tag) {
                        task.touch();
                    }
                })?;
            }
            TaskAction::RemoveTag { id, tag } => {
                self.tasks.modify(&id, |task| {
                    if task.tags.remove(&tag) {
                        task.touch();
                    }
                })?;
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.tasks.clear_selection();
    }

    /// A different filter invalidates the selection.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.tasks.clear_selection();
        }
    }

    pub fn set_list(&mut self, list: ListSelector) {
        if list != self.list {
            self.list = list;
            self.tasks.clear_selection();
        }
    }

    pub fn set_search(&mut self, query: String) {
        self.search = query;
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn snapshot(&self) -> TaskSnapshot<'_> {
        TaskSnapshot {
            visible: self.visible(),
            selected: self.tasks.selected(),
            filter: self.filter,
            list: &self.list,
            search: &self.search,
            today: self.today,
            total: self.tasks.len(),
        }
    }

    /// Tasks in the active list, then the active filter, then the search.
    pub fn visible(&self) -> Vec<&Task> {
        let in_list = partition_by_list(self.tasks.items(), &self.list, self.today);
        filter_tasks(in_list, self.filter, self.today)
            .into_iter()
            .filter(|task| task_matches_search(task, &self.search))
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn selected(&self) -> Option<&Task> {
        self.tasks.selected()
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn list(&self) -> &ListSelector {
        &self.list
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

#[derive(Debug, Clone)]
pub enum NoteAction {
    Loaded(Vec<Note>),
    Inserted(Note),
    Removed(String),
    Select(String),
    ClearSelection,
    /// `None` shows every folder.
    SetFolder(Option<String>),
    /// `None` shows every tag.
    SetTag(Option<String>),
    SetSearch(String),
    Update { id: String, patch: NotePatch },
    AddTag { id: String, tag: String },
    RemoveTag { id: String, tag: String },
}

#[derive(Debug, Clone, Default)]
pub struct NoteView {
    notes: SelectionState<Note>,
    folder: Option<String>,
    tag: Option<String>,
    search: String,
}

#[derive(Debug)]
pub struct NoteSnapshot<'a> {
    pub visible: Vec<&'a Note>,
    pub selected: Option<&'a Note>,
    pub folder: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub search: &'a str,
    pub total: usize,
}

impl NoteView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: NoteAction) -> Result<(), SelectionError> {
        debug!(?action, "note view action");
        match action {
            NoteAction::Loaded(notes) => self.notes.replace_all(notes),
            NoteAction::Inserted(note) => self.notes.insert(note)?,
            NoteAction::Removed(id) => {
                self.notes.remove(&id);
            }
            NoteAction::Select(id) => {
                self.notes.select(&id)?;
            }
            NoteAction::ClearSelection => self.clear_selection(),
            NoteAction::SetFolder(folder) => self.set_folder(folder),
            NoteAction::SetTag(tag) => self.set_tag(tag),
            NoteAction::SetSearch(query) => self.set_search(query),
            NoteAction::Update { id, patch } => {
                self.notes.update(&id, patch)?;
            }
            NoteAction::AddTag { id, tag } => {
                self.notes.modify(&id, |note| {
                    if note.tags.insert(&tag) {
                        note.touch();
                    }
                })?;
            }
            NoteAction::RemoveTag { id, tag } => {
                self.notes.modify(&id, |note| {
                    if note.tags.remove(&tag) {
                        note.touch();
                    }
                })?;
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.notes.clear_selection();
    }

    pub fn set_folder(&mut self, folder: Option<String>) {
        if folder != self.folder {
            self.folder = folder;
            self.notes.clear_selection();
        }
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        if tag != self.tag {
            self.tag = tag;
            self.notes.clear_selection();
        }
    }

    pub fn set_search(&mut self, query: String) {
        self.search = query;
    }

    pub fn snapshot(&self) -> NoteSnapshot<'_> {
        NoteSnapshot {
            visible: self.visible(),
            selected: self.notes.selected(),
            folder: self.folder.as_deref(),
            tag: self.tag.as_deref(),
            search: &self.search,
            total: self.notes.len(),
        }
    }

    pub fn visible(&self) -> Vec<&Note> {
        self.notes
            .items()
            .iter()
            .filter(|note| self.folder.as_deref().is_none_or(|f| note.folder_name() == f))
            .filter(|note| self.tag.as_deref().is_none_or(|t| note.tags.contains(t)))
            .filter(|note| note_matches_search(note, &self.search))
            .collect()
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.items()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn selected(&self) -> Option<&Note> {
        self.notes.selected()
    }

    /// Resolve a `[[Title]]` link, ignoring case.
    pub fn find_by_title(&self, title: &str) -> Option<&Note> {
        let title = title.trim().to_lowercase();
        self.notes
            .items()
            .iter()
            .find(|note| note.title.trim().to_lowercase() == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    fn view_with(titles: &[&str]) -> (TaskView, Vec<String>) {
        let tasks: Vec<Task> = titles.iter().map(|t| Task::new("u1", t.to_string())).collect();
        let ids = tasks.iter().map(|t| t.id.clone()).collect();
        let mut view = TaskView::new(today());
        view.dispatch(TaskAction::Loaded(tasks)).unwrap();
        (view, ids)
    }

    #[test]
    fn switching_filter_clears_selection() {
        let (mut view, ids) = view_with(&["a"]);
        view.dispatch(TaskAction::Select(ids[0].clone())).unwrap();
        view.dispatch(TaskAction::SetFilter(TaskFilter::Completed)).unwrap();
        assert!(view.selected().is_none());
    }

    #[test]
    fn reselecting_same_filter_keeps_selection() {
        let (mut view, ids) = view_with(&["a"]);
        view.dispatch(TaskAction::Select(ids[0].clone())).unwrap();
        view.dispatch(TaskAction::SetFilter(TaskFilter::All)).unwrap();
        assert!(view.selected().is_some());
    }

    #[test]
    fn switching_list_clears_selection() {
        let (mut view, ids) = view_with(&["a"]);
        view.dispatch(TaskAction::Select(ids[0].clone())).unwrap();
        view.dispatch(TaskAction::SetList(ListSelector::parse("work"))).unwrap();
        assert!(view.snapshot().selected.is_none());
    }

    #[test]
    fn toggle_shows_in_detail_and_list() {
        let (mut view, ids) = view_with(&["a", "b"]);
        view.dispatch(TaskAction::Select(ids[1].clone())).unwrap();
        view.dispatch(TaskAction::ToggleCompleted(ids[1].clone())).unwrap();
        let snapshot = view.snapshot();
        assert!(snapshot.selected.unwrap().completed);
        assert!(snapshot.visible.iter().find(|t| t.id == ids[1]).unwrap().completed);
    }

    #[test]
    fn snapshot_applies_search_after_filter() {
        let (mut view, _) = view_with(&["Buy milk", "Call mom"]);
        view.dispatch(TaskAction::SetSearch("milk".into())).unwrap();
        let titles: Vec<_> = view.snapshot().visible.iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, ["Buy milk"]);
    }

    #[test]
    fn visible_applies_list_then_filter() {
        let (mut view, ids) = view_with(&["a", "b", "c"]);
        view.dispatch(TaskAction::ToggleStarred(ids[0].clone())).unwrap();
        view.dispatch(TaskAction::ToggleStarred(ids[1].clone())).unwrap();
        view.dispatch(TaskAction::ToggleCompleted(ids[1].clone())).unwrap();
        view.set_list(ListSelector::parse("important"));
        view.set_filter(TaskFilter::Completed);
        let titles: Vec<_> = view.visible().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["b"]);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let (mut view, _) = view_with(&["a"]);
        assert!(view.dispatch(TaskAction::ToggleStarred("nope".into())).is_err());
    }

    #[test]
    fn note_folder_filter_and_lookup() {
        let mut work = Note::new("u1", "Plan".into(), String::new());
        work.folder = Some("Work".into());
        let loose = Note::new("u1", "Loose".into(), String::new());
        let mut view = NoteView::new();
        view.dispatch(NoteAction::Loaded(vec![work, loose])).unwrap();
        view.dispatch(NoteAction::SetFolder(Some("Unfiled".into()))).unwrap();
        let titles: Vec<_> = view.visible().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Loose"]);
        assert_eq!(view.find_by_title("plan").map(|n| n.title.as_str()), Some("Plan"));
    }

    #[test]
    fn deleting_selected_note_clears_selection() {
        let note = Note::new("u1", "n".into(), String::new());
        let id = note.id.clone();
        let mut view = NoteView::new();
        view.dispatch(NoteAction::Inserted(note)).unwrap();
        view.dispatch(NoteAction::Select(id.clone())).unwrap();
        view.dispatch(NoteAction::Removed(id)).unwrap();
        assert!(view.snapshot().selected.is_none());
    }
}
