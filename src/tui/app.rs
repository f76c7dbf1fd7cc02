use chrono::NaiveDate;
use ratatui::widgets::ListState;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::auth::{AuthError, LocalAuth, Route, SessionProvider, guard};
use crate::calendar;
use crate::config::Config;
use crate::database::Database;
use crate::draft::{NoteDraft, TaskDraft};
use crate::filter::{SmartList, TaskFilter};
use crate::markdown::Document;
use crate::models::{INBOX_LIST_ID, Note, NotePatch, Priority, Task, TaskPatch, UNFILED_FOLDER};
use crate::partition::{ListSelector, group_by_folder, group_by_priority, partition_by_list, tag_index};
use crate::state::{NoteAction, TaskAction};
use crate::tags::TagSet;
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::workspace::{Workspace, WorkspaceError};

/// How long a status bar message stays up.
pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

pub type AppWorkspace = Workspace<Rc<Database>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tasks,
    Today,
    Calendar,
    Notes,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Tasks, Tab::Today, Tab::Calendar, Tab::Notes, Tab::Stats];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Tasks => "Tasks",
            Tab::Today => "Today",
            Tab::Calendar => "Calendar",
            Tab::Notes => "Notes",
            Tab::Stats => "Stats",
        }
    }

    /// Map a `default_view` config value to its tab.
    pub fn from_view_name(name: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.title().eq_ignore_ascii_case(name.trim()))
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    /// Tabs whose item list shows tasks from the task view.
    pub fn shows_tasks(self) -> bool {
        matches!(self, Tab::Tasks | Tab::Today)
    }

    pub fn has_sidebar(self) -> bool {
        matches!(self, Tab::Tasks | Tab::Notes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Items,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Search,
    Form,
    Prompt,
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `tag` adds, `-tag` removes.
    Tag,
    NewList,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Tag => "Tag (prefix with - to remove)",
            PromptKind::NewList => "New list name",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub editor: Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    DueDate,
    Priority,
    List,
    Tags,
}

impl TaskField {
    pub const ALL: [TaskField; 6] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::DueDate,
        TaskField::Priority,
        TaskField::List,
        TaskField::Tags,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::DueDate => "Due (YYYY-MM-DD)",
            TaskField::Priority => "Priority",
            TaskField::List => "List",
            TaskField::Tags => "Tags (comma-separated)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    /// Saving patches the selected task; `false` creates a new one.
    pub editing: bool,
    pub title: Editor,
    pub description: Editor,
    pub due_date: Editor,
    pub priority: Priority,
    pub list_index: usize,
    pub tags: Editor,
    pub current_field: TaskField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Folder,
    Tags,
    Content,
}

impl NoteField {
    pub const ALL: [NoteField; 4] = [NoteField::Title, NoteField::Folder, NoteField::Tags, NoteField::Content];

    pub fn label(self) -> &'static str {
        match self {
            NoteField::Title => "Title",
            NoteField::Folder => "Folder",
            NoteField::Tags => "Tags (comma-separated)",
            NoteField::Content => "Content (markdown)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteForm {
    pub editing: bool,
    pub title: Editor,
    pub folder: Editor,
    pub tags: Editor,
    pub content: Editor,
    pub current_field: NoteField,
}

#[derive(Debug, Clone)]
pub enum Form {
    Task(TaskForm),
    Note(NoteForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::Name => "Name",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub name: Editor,
    pub email: Editor,
    pub password: Editor,
    pub current_field: AuthField,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            name: Editor::single_line(),
            email: Editor::single_line(),
            password: Editor::single_line(),
            current_field: AuthField::Email,
        }
    }
}

impl AuthForm {
    /// Fields shown on a route, in tab order.
    pub fn fields(route: Route) -> &'static [AuthField] {
        match route {
            Route::SignUp => &[AuthField::Name, AuthField::Email, AuthField::Password],
            _ => &[AuthField::Email, AuthField::Password],
        }
    }

    pub fn editor(&self, field: AuthField) -> &Editor {
        match field {
            AuthField::Name => &self.name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    pub fn current_editor(&mut self) -> &mut Editor {
        match self.current_field {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Task { id: String, title: String },
    Note { id: String, title: String },
}

impl DeleteTarget {
    pub fn describe(&self) -> (&'static str, &str) {
        match self {
            DeleteTarget::Task { title, .. } => ("task", title),
            DeleteTarget::Note { title, .. } => ("note", title),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmState {
    pub target: Option<DeleteTarget>,
    /// 0 = Delete, 1 = Cancel
    pub selection: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarTarget {
    Tasks(ListSelector),
    AllNotes,
    Folder(String),
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub label: String,
    pub count: usize,
    pub target: SidebarTarget,
}

/// One row of the item list. Headers appear when grouping is on.
#[derive(Debug, Clone, Copy)]
pub enum ListRow<'a> {
    Header(&'a str),
    Task(&'a Task),
    Note(&'a Note),
}

impl ListRow<'_> {
    pub fn id(&self) -> Option<&str> {
        match self {
            ListRow::Header(_) => None,
            ListRow::Task(task) => Some(&task.id),
            ListRow::Note(note) => Some(&note.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub sidebar_state: SidebarState,
    pub focus: Focus,
    pub mode: Mode,
    pub list_state: ListState,
    pub sidebar_list_state: ListState,
    /// Group tasks by priority and notes by folder.
    pub grouped: bool,
    pub detail_scroll: u16,
    pub calendar_day: NaiveDate,
    /// Filter and list of the Tasks tab while another tab borrows the task view.
    pub saved_task_view: (TaskFilter, ListSelector),
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    db: Rc<Database>,
    auth: LocalAuth,
    pub route: Route,
    pub workspace: Option<AppWorkspace>,
    pub auth_form: AuthForm,
    pub ui: UiState,
    pub status: StatusState,
    pub form: Option<Form>,
    pub prompt: Option<Prompt>,
    pub search: Editor,
    pub confirm: ConfirmState,
}

impl App {
    pub fn new(config: Config, db: Rc<Database>, auth: LocalAuth, today: NaiveDate) -> Result<Self, TuiError> {
        let current_tab = Tab::from_view_name(&config.default_view).unwrap_or(Tab::Tasks);
        let mut app = Self {
            config,
            db,
            auth,
            route: Route::Landing,
            workspace: None,
            auth_form: AuthForm::default(),
            ui: UiState {
                current_tab: Tab::Tasks,
                sidebar_state: SidebarState::Expanded,
                focus: Focus::Items,
                mode: Mode::View,
                list_state: ListState::default(),
                sidebar_list_state: ListState::default(),
                grouped: false,
                detail_scroll: 0,
                calendar_day: today,
                saved_task_view: (TaskFilter::All, ListSelector::All),
            },
            status: StatusState::default(),
            form: None,
            prompt: None,
            search: Editor::single_line(),
            confirm: ConfirmState::default(),
        };

        if app.signed_in() {
            app.open_workspace(today)?;
            app.route = Route::Dashboard;
            app.switch_tab(current_tab);
        }
        Ok(app)
    }

    pub fn signed_in(&self) -> bool {
        self.auth.current_user().is_some()
    }

    fn open_workspace(&mut self, today: NaiveDate) -> Result<(), TuiError> {
        let user = self.auth.current_user().cloned().ok_or(AuthError::NotSignedIn)?;
        info!(user_id = %user.id, "opening workspace");
        self.workspace = Some(Workspace::open(Rc::clone(&self.db), user, today)?);
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.workspace
            .as_ref()
            .map(|ws| ws.tasks().today())
            .unwrap_or(self.ui.calendar_day)
    }

    /// Go to `route`, or wherever the access rules send us instead.
    pub fn navigate(&mut self, route: Route) {
        let target = guard(route, self.signed_in());
        if target != route {
            info!(?route, ?target, "navigation redirected");
        }
        match target {
            Route::Dashboard => {
                if self.workspace.is_none() {
                    let today = self.ui.calendar_day;
                    if let Err(err) = self.open_workspace(today) {
                        warn!(error = %err, "could not open workspace");
                        self.set_status_message(err.to_string());
                        self.route = Route::Landing;
                        return;
                    }
                }
                let tab = Tab::from_view_name(&self.config.default_view).unwrap_or(Tab::Tasks);
                self.route = Route::Dashboard;
                self.switch_tab(tab);
            }
            other => {
                self.workspace = None;
                self.form = None;
                self.prompt = None;
                self.confirm = ConfirmState::default();
                self.ui.mode = Mode::View;
                self.auth_form = AuthForm::default();
                if other == Route::SignUp {
                    self.auth_form.current_field = AuthField::Name;
                }
                self.route = other;
            }
        }
    }

    pub fn next_auth_field(&mut self, forward: bool) {
        let fields = AuthForm::fields(self.route);
        let position = fields
            .iter()
            .position(|field| *field == self.auth_form.current_field)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % fields.len()
        } else {
            (position + fields.len() - 1) % fields.len()
        };
        self.auth_form.current_field = fields[next];
    }

    /// Submit the sign-in or sign-up form.
    pub fn submit_auth(&mut self) -> Result<(), TuiError> {
        let email = self.auth_form.email.text();
        let password = self.auth_form.password.text();
        let user = match self.route {
            Route::SignUp => self.auth.sign_up(&self.auth_form.name.text(), &email, &password)?,
            Route::SignIn => self.auth.sign_in(&email, &password)?,
            _ => return Ok(()),
        };
        self.navigate(Route::Dashboard);
        self.set_status_message(format!("Signed in as {}", user.email));
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), TuiError> {
        self.auth.sign_out()?;
        self.navigate(Route::Dashboard);
        self.set_status_message("Signed out".to_string());
        Ok(())
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.clear_status_message();
            }
        }
    }

    /// Show an error in the status bar. Nothing the user does is fatal.
    pub fn report(&mut self, result: Result<(), TuiError>) {
        if let Err(err) = result {
            warn!(error = %err, "action failed");
            self.set_status_message(err.to_string());
        }
    }

    /// Roll the task view over to a new day.
    pub fn tick(&mut self, today: NaiveDate) {
        if let Some(ws) = self.workspace.as_mut() {
            ws.set_today(today);
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.ui.sidebar_state = match self.ui.sidebar_state {
            SidebarState::Expanded => SidebarState::Collapsed,
            SidebarState::Collapsed => SidebarState::Expanded,
        };
        if self.ui.sidebar_state == SidebarState::Collapsed {
            self.ui.focus = Focus::Items;
        }
    }

    pub fn sidebar_visible(&self) -> bool {
        self.ui.sidebar_state == SidebarState::Expanded && self.ui.current_tab.has_sidebar()
    }

    pub fn toggle_focus(&mut self) {
        self.ui.focus = match self.ui.focus {
            Focus::Items if self.sidebar_visible() => Focus::Sidebar,
            _ => Focus::Items,
        };
    }

    pub fn toggle_grouping(&mut self) {
        self.ui.grouped = !self.ui.grouped;
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        let previous = self.ui.current_tab;
        let today = self.today();
        if let Some(ws) = self.workspace.as_mut() {
            if tab != previous {
                ws.clear_selections();
            }
            if previous == Tab::Tasks && tab != Tab::Tasks {
                self.ui.saved_task_view = (ws.tasks().filter(), ws.tasks().list().clone());
            }
            let view = match tab {
                Tab::Today => Some((TaskFilter::Today, ListSelector::All)),
                Tab::Tasks if previous != Tab::Tasks => Some(self.ui.saved_task_view.clone()),
                _ => None,
            };
            if let Some((filter, list)) = view {
                ws.set_task_filter(filter);
                ws.set_task_list(list);
            }
        }
        if tab == Tab::Calendar && previous != Tab::Calendar {
            self.ui.calendar_day = today;
        }
        self.ui.current_tab = tab;
        self.ui.focus = Focus::Items;
        self.ui.mode = Mode::View;
        self.ui.detail_scroll = 0;
        self.sync_list_state();
    }

    pub fn next_tab(&mut self, forward: bool) {
        let index = self.ui.current_tab.index();
        let len = Tab::ALL.len();
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        self.switch_tab(Tab::ALL[next]);
    }

    pub fn set_task_filter(&mut self, filter: TaskFilter) {
        if self.ui.current_tab != Tab::Tasks {
            return;
        }
        if let Some(ws) = self.workspace.as_mut() {
            ws.set_task_filter(filter);
        }
        self.sync_list_state();
    }

    /// Rows of the item list for the current tab.
    pub fn rows(&self) -> Vec<ListRow<'_>> {
        let Some(ws) = self.workspace.as_ref() else {
            return Vec::new();
        };
        match self.ui.current_tab {
            Tab::Tasks | Tab::Today => {
                let visible = ws.tasks().visible();
                if self.ui.grouped {
                    group_by_priority(visible)
                        .into_iter()
                        .flat_map(|(priority, tasks)| {
                            std::iter::once(ListRow::Header(priority_heading(priority)))
                                .chain(tasks.into_iter().map(ListRow::Task))
                        })
                        .collect()
                } else {
                    visible.into_iter().map(ListRow::Task).collect()
                }
            }
            Tab::Notes => {
                let visible = ws.notes().visible();
                if self.ui.grouped {
                    group_by_folder(visible)
                        .into_iter()
                        .flat_map(|group| {
                            std::iter::once(ListRow::Header(group.name))
                                .chain(group.notes.into_iter().map(ListRow::Note))
                        })
                        .collect()
                } else {
                    visible.into_iter().map(ListRow::Note).collect()
                }
            }
            Tab::Calendar => calendar::tasks_due_on(ws.tasks().tasks(), self.ui.calendar_day)
                .into_iter()
                .map(ListRow::Task)
                .collect(),
            Tab::Stats => Vec::new(),
        }
    }

    fn selected_id(&self) -> Option<String> {
        let ws = self.workspace.as_ref()?;
        if self.ui.current_tab == Tab::Notes {
            ws.selected_note_id().ok()
        } else {
            ws.selected_task_id().ok()
        }
    }

    /// Point the list widget at the selected item's row.
    pub fn sync_list_state(&mut self) {
        let selected = self.selected_id();
        let index = selected.and_then(|id| self.rows().iter().position(|row| row.id() == Some(id.as_str())));
        self.ui.list_state.select(index);
        let active = self.active_sidebar_index();
        self.ui.sidebar_list_state.select(active);
    }

    /// Move the selection by `delta` selectable rows. With nothing selected
    /// the first row is picked.
    pub fn move_selection(&mut self, delta: isize) {
        let ids: Vec<String> = self
            .rows()
            .iter()
            .filter_map(|row| row.id().map(str::to_string))
            .collect();
        if ids.is_empty() {
            return;
        }
        let current = self.selected_id().and_then(|id| ids.iter().position(|other| *other == id));
        let next = match current {
            Some(index) => (index as isize + delta).clamp(0, ids.len() as isize - 1) as usize,
            None => 0,
        };
        self.select_item(&ids[next]);
    }

    fn select_item(&mut self, id: &str) {
        let is_note = self.ui.current_tab == Tab::Notes;
        if let Some(ws) = self.workspace.as_mut() {
            let result = if is_note {
                ws.dispatch_notes(NoteAction::Select(id.to_string()))
            } else {
                ws.dispatch_tasks(TaskAction::Select(id.to_string()))
            };
            if let Err(err) = result {
                self.set_status_message(err.to_string());
            }
        }
        self.ui.detail_scroll = 0;
        self.sync_list_state();
    }

    pub fn scroll_detail(&mut self, delta: i16) {
        self.ui.detail_scroll = self.ui.detail_scroll.saturating_add_signed(delta);
    }

    /// Lists for the Tasks tab, folders and tags for the Notes tab.
    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let Some(ws) = self.workspace.as_ref() else {
            return Vec::new();
        };
        match self.ui.current_tab {
            Tab::Tasks => {
                let today = ws.tasks().today();
                let open_count = |selector: &ListSelector| {
                    partition_by_list(ws.tasks().tasks(), selector, today)
                        .into_iter()
                        .filter(|task| !task.completed)
                        .count()
                };
                let mut selectors = vec![ListSelector::All];
                selectors.extend(SmartList::ALL.into_iter().map(ListSelector::Smart));
                selectors.extend(
                    ws.lists()
                        .iter()
                        .filter(|list| list.id != INBOX_LIST_ID)
                        .map(|list| ListSelector::List(list.id.clone())),
                );
                selectors
                    .into_iter()
                    .map(|selector| SidebarEntry {
                        label: match &selector {
                            ListSelector::All => "All".to_string(),
                            ListSelector::Smart(smart) => smart.label().to_string(),
                            ListSelector::List(id) => ws.list_name(id).to_string(),
                        },
                        count: open_count(&selector),
                        target: SidebarTarget::Tasks(selector),
                    })
                    .collect()
            }
            Tab::Notes => {
                let notes = ws.notes().notes();
                let mut entries = vec![SidebarEntry {
                    label: "All notes".to_string(),
                    count: notes.len(),
                    target: SidebarTarget::AllNotes,
                }];
                entries.extend(group_by_folder(notes).into_iter().map(|group| SidebarEntry {
                    label: group.name.to_string(),
                    count: group.notes.len(),
                    target: SidebarTarget::Folder(group.name.to_string()),
                }));
                entries.extend(tag_index(notes).into_iter().map(|tag| SidebarEntry {
                    label: format!("#{}", tag.tag),
                    count: tag.count,
                    target: SidebarTarget::Tag(tag.tag),
                }));
                entries
            }
            _ => Vec::new(),
        }
    }

    fn active_sidebar_index(&self) -> Option<usize> {
        let ws = self.workspace.as_ref()?;
        let active = match self.ui.current_tab {
            Tab::Tasks => SidebarTarget::Tasks(ws.tasks().list().clone()),
            Tab::Notes => {
                let snapshot = ws.notes().snapshot();
                match (snapshot.folder, snapshot.tag) {
                    (Some(folder), _) => SidebarTarget::Folder(folder.to_string()),
                    (None, Some(tag)) => SidebarTarget::Tag(tag.to_string()),
                    (None, None) => SidebarTarget::AllNotes,
                }
            }
            _ => return None,
        };
        self.sidebar_entries().iter().position(|entry| entry.target == active)
    }

    /// Step through the sidebar; the entry under the cursor is applied at once.
    pub fn move_sidebar(&mut self, delta: isize) {
        let entries = self.sidebar_entries();
        if entries.is_empty() {
            return;
        }
        let current = self.active_sidebar_index().unwrap_or(0);
        let next = (current as isize + delta).clamp(0, entries.len() as isize - 1) as usize;
        self.apply_sidebar_target(entries[next].target.clone());
    }

    pub fn apply_sidebar_target(&mut self, target: SidebarTarget) {
        let Some(ws) = self.workspace.as_mut() else {
            return;
        };
        match target {
            SidebarTarget::Tasks(selector) => ws.set_task_list(selector),
            SidebarTarget::AllNotes => {
                ws.set_note_folder(None);
                ws.set_note_tag(None);
            }
            SidebarTarget::Folder(folder) => {
                ws.set_note_tag(None);
                ws.set_note_folder(Some(folder));
            }
            SidebarTarget::Tag(tag) => {
                ws.set_note_folder(None);
                ws.set_note_tag(Some(tag));
            }
        }
        self.sync_list_state();
    }

    pub fn enter_search_mode(&mut self) {
        let query = self.workspace.as_ref().map(|ws| {
            if self.ui.current_tab == Tab::Notes {
                ws.notes().snapshot().search.to_string()
            } else {
                ws.tasks().snapshot().search.to_string()
            }
        });
        self.search = Editor::single_line_from(&query.unwrap_or_default());
        self.ui.mode = Mode::Search;
    }

    /// Push the search box contents to the active view.
    pub fn apply_search(&mut self) {
        let query = self.search.text();
        let is_note = self.ui.current_tab == Tab::Notes;
        if let Some(ws) = self.workspace.as_mut() {
            if is_note {
                ws.set_note_search(query);
            } else {
                ws.set_task_search(query);
            }
        }
        self.sync_list_state();
    }

    pub fn exit_search_mode(&mut self, keep_query: bool) {
        if !keep_query {
            self.search.clear();
            self.apply_search();
        }
        self.ui.mode = Mode::View;
    }

    pub fn toggle_selected_completed(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let id = ws.selected_task_id()?;
        ws.toggle_completed(&id)?;
        self.sync_list_state();
        Ok(())
    }

    pub fn toggle_selected_starred(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let id = ws.selected_task_id()?;
        ws.toggle_starred(&id)?;
        self.sync_list_state();
        Ok(())
    }

    pub fn open_new_form(&mut self) {
        let Some(ws) = self.workspace.as_ref() else {
            return;
        };
        let form = match self.ui.current_tab {
            Tab::Notes => {
                let folder = ws
                    .notes()
                    .snapshot()
                    .folder
                    .filter(|folder| *folder != UNFILED_FOLDER)
                    .unwrap_or_default()
                    .to_string();
                Form::Note(NoteForm {
                    editing: false,
                    title: Editor::single_line(),
                    folder: Editor::single_line_from(&folder),
                    tags: Editor::single_line(),
                    content: Editor::new(),
                    current_field: NoteField::Title,
                })
            }
            Tab::Stats => return,
            tab => {
                let due = match tab {
                    Tab::Today => ws.tasks().today().format("%Y-%m-%d").to_string(),
                    Tab::Calendar => self.ui.calendar_day.format("%Y-%m-%d").to_string(),
                    _ => String::new(),
                };
                let list_index = match ws.tasks().list() {
                    ListSelector::List(id) => ws.lists().iter().position(|list| list.id == *id).unwrap_or(0),
                    _ => 0,
                };
                Form::Task(TaskForm {
                    editing: false,
                    title: Editor::single_line(),
                    description: Editor::new(),
                    due_date: Editor::single_line_from(&due),
                    priority: Priority::None,
                    list_index,
                    tags: Editor::single_line(),
                    current_field: TaskField::Title,
                })
            }
        };
        self.form = Some(form);
        self.ui.mode = Mode::Form;
    }

    pub fn open_edit_form(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_ref().ok_or(AuthError::NotSignedIn)?;
        let form = if self.ui.current_tab == Tab::Notes {
            let note = ws.notes().selected().ok_or(WorkspaceError::NoSelection)?;
            Form::Note(NoteForm {
                editing: true,
                title: Editor::single_line_from(&note.title),
                folder: Editor::single_line_from(note.folder.as_deref().unwrap_or_default()),
                tags: Editor::single_line_from(&note.tags.to_string()),
                content: Editor::from_string(&note.content),
                current_field: NoteField::Title,
            })
        } else {
            let task = ws.tasks().selected().ok_or(WorkspaceError::NoSelection)?;
            Form::Task(TaskForm {
                editing: true,
                title: Editor::single_line_from(&task.title),
                description: Editor::from_string(task.description.as_deref().unwrap_or_default()),
                due_date: Editor::single_line_from(
                    &task.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                ),
                priority: task.priority,
                list_index: ws.lists().iter().position(|list| list.id == task.list_id).unwrap_or(0),
                tags: Editor::single_line_from(&task.tags.to_string()),
                current_field: TaskField::Title,
            })
        };
        self.form = Some(form);
        self.ui.mode = Mode::Form;
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
            let index = all.iter().position(|field| *field == current).unwrap_or(0);
            let len = all.len();
            all[if forward { (index + 1) % len } else { (index + len - 1) % len }]
        }
        match self.form.as_mut() {
            Some(Form::Task(form)) => form.current_field = step(&TaskField::ALL, form.current_field, forward),
            Some(Form::Note(form)) => form.current_field = step(&NoteField::ALL, form.current_field, forward),
            None => {}
        }
    }

    /// The text editor of the focused form field, if it has one.
    pub fn current_form_editor(&mut self) -> Option<&mut Editor> {
        match self.form.as_mut()? {
            Form::Task(form) => match form.current_field {
                TaskField::Title => Some(&mut form.title),
                TaskField::Description => Some(&mut form.description),
                TaskField::DueDate => Some(&mut form.due_date),
                TaskField::Tags => Some(&mut form.tags),
                TaskField::Priority | TaskField::List => None,
            },
            Form::Note(form) => Some(match form.current_field {
                NoteField::Title => &mut form.title,
                NoteField::Folder => &mut form.folder,
                NoteField::Tags => &mut form.tags,
                NoteField::Content => &mut form.content,
            }),
        }
    }

    /// Cycle the priority or list picker of the task form.
    pub fn cycle_form_choice(&mut self, forward: bool) {
        let list_count = self.workspace.as_ref().map(|ws| ws.lists().len()).unwrap_or(1).max(1);
        if let Some(Form::Task(form)) = self.form.as_mut() {
            match form.current_field {
                TaskField::Priority => {
                    form.priority = if forward {
                        form.priority.next()
                    } else {
                        // three steps forward is one back
                        form.priority.next().next().next()
                    };
                }
                TaskField::List => {
                    form.list_index = if forward {
                        (form.list_index + 1) % list_count
                    } else {
                        (form.list_index + list_count - 1) % list_count
                    };
                }
                _ => {}
            }
        }
    }

    /// Validate and persist the open form. On failure the form stays open.
    pub fn save_form(&mut self) -> Result<(), TuiError> {
        let Some(form) = self.form.clone() else {
            return Ok(());
        };
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let message = match form {
            Form::Task(form) => {
                let list_id = ws
                    .lists()
                    .get(form.list_index)
                    .map(|list| list.id.clone())
                    .unwrap_or_else(|| INBOX_LIST_ID.to_string());
                let description = form.description.text();
                let due = form.due_date.text();
                let tags = form.tags.text();
                let draft = TaskDraft::from_fields(
                    &form.title.text(),
                    Some(&description),
                    Some(&due),
                    form.priority,
                    Some(&list_id),
                    Some(&tags),
                )
                .map_err(WorkspaceError::from)?;
                if form.editing {
                    let patch = TaskPatch {
                        title: Some(draft.title.trim().to_string()),
                        description: Some(draft.description),
                        due_date: Some(draft.due_date),
                        priority: Some(draft.priority),
                        list_id: Some(list_id),
                        tags: Some(draft.tags),
                        ..TaskPatch::default()
                    };
                    ws.update_selected_task(patch)?;
                    "Task updated"
                } else {
                    let id = ws.create_task(draft)?;
                    ws.dispatch_tasks(TaskAction::Select(id))?;
                    "Task created"
                }
            }
            Form::Note(form) => {
                let folder = form.folder.text();
                let folder = Some(folder.trim().to_string()).filter(|f| !f.is_empty());
                let tags = TagSet::parse(&form.tags.text());
                if form.editing {
                    let patch = NotePatch {
                        title: Some(form.title.text().trim().to_string()),
                        content: Some(form.content.text()),
                        tags: Some(tags),
                        folder: Some(folder),
                    };
                    ws.update_selected_note(patch)?;
                    "Note updated"
                } else {
                    let draft = NoteDraft {
                        title: form.title.text(),
                        content: form.content.text(),
                        folder,
                        tags,
                    };
                    let id = ws.create_note(draft)?;
                    // A new note may sit outside the current folder or tag.
                    if ws.dispatch_notes(NoteAction::Select(id)).is_err() {
                        warn!("new note could not be selected");
                    }
                    "Note created"
                }
            }
        };
        self.close_form();
        self.sync_list_state();
        self.set_status_message(message.to_string());
        Ok(())
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        if kind == PromptKind::NewList && self.ui.current_tab != Tab::Tasks {
            return;
        }
        self.prompt = Some(Prompt {
            kind,
            editor: Editor::single_line(),
        });
        self.ui.mode = Mode::Prompt;
    }

    pub fn close_prompt(&mut self) {
        self.prompt = None;
        self.ui.mode = Mode::View;
    }

    pub fn submit_prompt(&mut self) -> Result<(), TuiError> {
        let Some(prompt) = self.prompt.take() else {
            return Ok(());
        };
        self.ui.mode = Mode::View;
        let input = prompt.editor.text();
        let is_note = self.ui.current_tab == Tab::Notes;
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let message = match prompt.kind {
            PromptKind::Tag => {
                let (remove, tag) = match input.trim().strip_prefix('-') {
                    Some(tag) => (true, tag.to_string()),
                    None => (false, input.trim().to_string()),
                };
                let id = if is_note { ws.selected_note_id()? } else { ws.selected_task_id()? };
                match (is_note, remove) {
                    (true, false) => ws.add_note_tag(&id, &tag)?,
                    (true, true) => ws.remove_note_tag(&id, &tag)?,
                    (false, false) => ws.add_task_tag(&id, &tag)?,
                    (false, true) => ws.remove_task_tag(&id, &tag)?,
                }
                if remove {
                    format!("Removed tag {}", tag.trim())
                } else {
                    format!("Added tag {}", tag.trim())
                }
            }
            PromptKind::NewList => {
                let list = ws.create_list(&input)?;
                ws.set_task_list(ListSelector::List(list.id.clone()));
                format!("List {} created", list.name)
            }
        };
        self.sync_list_state();
        self.set_status_message(message);
        Ok(())
    }

    pub fn request_delete(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_ref().ok_or(AuthError::NotSignedIn)?;
        let target = if self.ui.current_tab == Tab::Notes {
            let note = ws.notes().selected().ok_or(WorkspaceError::NoSelection)?;
            DeleteTarget::Note {
                id: note.id.clone(),
                title: note.title.clone(),
            }
        } else {
            let task = ws.tasks().selected().ok_or(WorkspaceError::NoSelection)?;
            DeleteTarget::Task {
                id: task.id.clone(),
                title: task.title.clone(),
            }
        };
        self.confirm = ConfirmState {
            target: Some(target),
            selection: 1,
        };
        self.ui.mode = Mode::ConfirmDelete;
        Ok(())
    }

    /// Run the option highlighted in the confirmation dialog.
    pub fn confirm_delete(&mut self) -> Result<(), TuiError> {
        let confirm = std::mem::take(&mut self.confirm);
        self.ui.mode = Mode::View;
        let Some(target) = confirm.target.filter(|_| confirm.selection == 0) else {
            return Ok(());
        };
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let message = match target {
            DeleteTarget::Task { id, .. } => {
                ws.delete_task(&id)?;
                "Task deleted"
            }
            DeleteTarget::Note { id, .. } => {
                ws.delete_note(&id)?;
                "Note deleted"
            }
        };
        self.sync_list_state();
        self.set_status_message(message.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = ConfirmState::default();
        self.ui.mode = Mode::View;
    }

    /// Markdown for the selected task or note.
    pub fn selected_markdown(&self) -> Option<String> {
        let ws = self.workspace.as_ref()?;
        if self.ui.current_tab == Tab::Notes {
            ws.notes().selected().map(Note::to_markdown)
        } else {
            ws.tasks().selected().map(Task::to_markdown)
        }
    }

    pub fn copy_selected(&mut self) -> Result<(), TuiError> {
        let markdown = self.selected_markdown().ok_or(WorkspaceError::NoSelection)?;
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(markdown)?;
        self.set_status_message("Copied to clipboard".to_string());
        Ok(())
    }

    /// Jump to the first note the selected note links to with `[[Title]]`.
    pub fn follow_link(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        let note = ws.notes().selected().ok_or(WorkspaceError::NoSelection)?;
        let document = Document::parse(&note.content);
        let target = document
            .wiki_links()
            .into_iter()
            .find_map(|title| ws.notes().find_by_title(title))
            .map(|target| (target.id.clone(), target.title.clone()));

        let Some((id, title)) = target else {
            self.set_status_message("No linked note found".to_string());
            return Ok(());
        };
        ws.set_note_folder(None);
        ws.set_note_tag(None);
        ws.set_note_search(String::new());
        ws.dispatch_notes(NoteAction::Select(id))?;
        self.search.clear();
        self.ui.detail_scroll = 0;
        self.sync_list_state();
        self.set_status_message(format!("Opened {}", title));
        Ok(())
    }

    pub fn refresh(&mut self) -> Result<(), TuiError> {
        let ws = self.workspace.as_mut().ok_or(AuthError::NotSignedIn)?;
        ws.refresh()?;
        self.sync_list_state();
        self.set_status_message("Refreshed".to_string());
        Ok(())
    }

    pub fn move_calendar_day(&mut self, days: i64) {
        if let Some(day) = self.ui.calendar_day.checked_add_signed(chrono::Duration::days(days)) {
            self.ui.calendar_day = day;
        }
    }

    pub fn move_calendar_month(&mut self, months: i32) {
        self.ui.calendar_day = calendar::shift_month(self.ui.calendar_day, months);
    }

    pub fn calendar_to_today(&mut self) {
        self.ui.calendar_day = self.today();
    }
}

fn priority_heading(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "High priority",
        Priority::Medium => "Medium priority",
        Priority::Low => "Low priority",
        Priority::None => "No priority",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_with(sign_up: bool) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let db = Rc::new(Database::open_in_memory().unwrap());
        let mut auth = LocalAuth::new(Rc::clone(&db), dir.path().join("session.json")).unwrap();
        if sign_up {
            auth.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        }
        let app = App::new(Config::default(), db, auth, date(2025, 4, 10)).unwrap();
        (dir, app)
    }

    fn add_task(app: &mut App, title: &str, due: Option<NaiveDate>) -> String {
        let ws = app.workspace.as_mut().unwrap();
        let mut draft = TaskDraft::new(title);
        draft.due_date = due;
        ws.create_task(draft).unwrap()
    }

    fn type_into(editor: &mut Editor, text: &str) {
        for ch in text.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn signed_out_start_lands_on_landing() {
        let (_dir, app) = app_with(false);
        assert_eq!(app.route, Route::Landing);
        assert!(app.workspace.is_none());
    }

    #[test]
    fn dashboard_requires_sign_in() {
        let (_dir, mut app) = app_with(false);
        app.navigate(Route::Dashboard);
        assert_eq!(app.route, Route::Landing);
    }

    #[test]
    fn sign_up_form_opens_dashboard() {
        let (_dir, mut app) = app_with(false);
        app.navigate(Route::SignUp);
        assert_eq!(app.auth_form.current_field, AuthField::Name);
        type_into(&mut app.auth_form.name, "Grace");
        type_into(&mut app.auth_form.email, "grace@example.com");
        type_into(&mut app.auth_form.password, "hopper!");
        app.submit_auth().unwrap();
        assert_eq!(app.route, Route::Dashboard);
        assert!(app.workspace.is_some());
    }

    #[test]
    fn short_password_keeps_form_open() {
        let (_dir, mut app) = app_with(false);
        app.navigate(Route::SignIn);
        type_into(&mut app.auth_form.email, "a@b.c");
        type_into(&mut app.auth_form.password, "123");
        let err = app.submit_auth().unwrap_err();
        assert!(matches!(err, TuiError::Auth(AuthError::PasswordTooShort)));
        assert_eq!(app.route, Route::SignIn);
    }

    #[test]
    fn signed_in_user_skips_auth_pages() {
        let (_dir, mut app) = app_with(true);
        app.navigate(Route::SignIn);
        assert_eq!(app.route, Route::Dashboard);
        app.sign_out().unwrap();
        assert_eq!(app.route, Route::Landing);
        assert!(app.workspace.is_none());
    }

    #[test]
    fn moving_selection_walks_visible_rows() {
        let (_dir, mut app) = app_with(true);
        let a = add_task(&mut app, "a", None);
        let b = add_task(&mut app, "b", None);
        app.move_selection(1);
        assert_eq!(app.selected_id(), Some(a));
        app.move_selection(1);
        assert_eq!(app.selected_id(), Some(b.clone()));
        app.move_selection(1);
        assert_eq!(app.selected_id(), Some(b));
        assert_eq!(app.ui.list_state.selected(), Some(1));
    }

    #[test]
    fn today_tab_borrows_task_view_and_gives_it_back() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "due", Some(date(2025, 4, 10)));
        add_task(&mut app, "someday", None);
        app.set_task_filter(TaskFilter::Completed);
        app.switch_tab(Tab::Today);
        assert_eq!(app.rows().len(), 1);
        app.switch_tab(Tab::Tasks);
        assert_eq!(app.workspace.as_ref().unwrap().tasks().filter(), TaskFilter::Completed);
    }

    #[test]
    fn switching_tabs_clears_selection() {
        let (_dir, mut app) = app_with(true);
        let a = add_task(&mut app, "a", Some(date(2025, 4, 10)));
        app.move_selection(1);
        assert_eq!(app.selected_id(), Some(a.clone()));

        app.switch_tab(Tab::Notes);
        app.switch_tab(Tab::Tasks);
        assert_eq!(app.selected_id(), None);

        app.move_selection(1);
        app.switch_tab(Tab::Calendar);
        assert!(app.workspace.as_ref().unwrap().tasks().selected().is_none());

        app.switch_tab(Tab::Today);
        app.move_selection(1);
        app.switch_tab(Tab::Today);
        assert_eq!(app.selected_id(), Some(a));
    }

    #[test]
    fn grouping_adds_priority_headers() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "a", None);
        app.toggle_grouping();
        let rows = app.rows();
        assert!(matches!(rows[0], ListRow::Header("No priority")));
        assert!(matches!(rows[1], ListRow::Task(_)));
    }

    #[test]
    fn task_form_validates_before_saving() {
        let (_dir, mut app) = app_with(true);
        app.open_new_form();
        let err = app.save_form().unwrap_err();
        assert!(matches!(err, TuiError::Workspace(WorkspaceError::Validation(_))));
        assert!(app.form.is_some());

        app.current_form_editor().map(|editor| type_into(editor, "Write report"));
        app.navigate_form_field(true);
        app.navigate_form_field(true);
        app.current_form_editor().map(|editor| type_into(editor, "2025-04-12"));
        app.navigate_form_field(true);
        app.cycle_form_choice(true);
        app.save_form().unwrap();
        assert!(app.form.is_none());

        let task = app.workspace.as_ref().unwrap().tasks().selected().unwrap().clone();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.due_date, Some(date(2025, 4, 12)));
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn edit_form_updates_selected_task() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "old", None);
        app.move_selection(1);
        app.open_edit_form().unwrap();
        if let Some(editor) = app.current_form_editor() {
            editor.clear();
            type_into(editor, "new");
        }
        app.save_form().unwrap();
        let ws = app.workspace.as_ref().unwrap();
        assert_eq!(ws.tasks().selected().unwrap().title, "new");
        assert_eq!(ws.backend().get_tasks(&ws.user().id).unwrap()[0].title, "new");
    }

    #[test]
    fn edit_form_keeps_custom_list() {
        let (_dir, mut app) = app_with(true);
        let ws = app.workspace.as_mut().unwrap();
        ws.create_list("Work").unwrap();
        let draft = TaskDraft {
            list_id: Some("Work".into()),
            ..TaskDraft::new("report")
        };
        let id = ws.create_task(draft).unwrap();
        app.move_selection(1);
        app.open_edit_form().unwrap();
        app.save_form().unwrap();
        let task = app.workspace.as_ref().unwrap().tasks().get(&id).unwrap().clone();
        assert_eq!(task.list_id, "work");
    }

    #[test]
    fn delete_needs_confirmation() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "doomed", None);
        app.move_selection(1);
        app.request_delete().unwrap();
        assert_eq!(app.ui.mode, Mode::ConfirmDelete);
        // Cancel is highlighted first
        app.confirm_delete().unwrap();
        assert_eq!(app.rows().len(), 1);

        app.request_delete().unwrap();
        app.confirm.selection = 0;
        app.confirm_delete().unwrap();
        assert!(app.rows().is_empty());
        assert_eq!(app.selected_id(), None);
    }

    #[test]
    fn tag_prompt_adds_and_removes() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "a", None);
        app.move_selection(1);
        app.open_prompt(PromptKind::Tag);
        type_into(&mut app.prompt.as_mut().unwrap().editor, "home");
        app.submit_prompt().unwrap();
        assert!(app.workspace.as_ref().unwrap().tasks().selected().unwrap().tags.contains("home"));

        app.open_prompt(PromptKind::Tag);
        type_into(&mut app.prompt.as_mut().unwrap().editor, "-home");
        app.submit_prompt().unwrap();
        assert!(app.workspace.as_ref().unwrap().tasks().selected().unwrap().tags.is_empty());
    }

    #[test]
    fn new_list_becomes_active() {
        let (_dir, mut app) = app_with(true);
        app.open_prompt(PromptKind::NewList);
        type_into(&mut app.prompt.as_mut().unwrap().editor, "Grocery Run");
        app.submit_prompt().unwrap();
        let entries = app.sidebar_entries();
        assert_eq!(entries.last().unwrap().label, "Grocery Run");
        assert_eq!(app.ui.sidebar_list_state.selected(), Some(entries.len() - 1));
    }

    #[test]
    fn sidebar_walks_lists() {
        let (_dir, mut app) = app_with(true);
        app.move_sidebar(1);
        assert_eq!(
            app.workspace.as_ref().unwrap().tasks().list(),
            &ListSelector::Smart(SmartList::Inbox)
        );
        app.move_sidebar(-5);
        assert_eq!(app.workspace.as_ref().unwrap().tasks().list(), &ListSelector::All);
    }

    #[test]
    fn wiki_link_opens_target_note() {
        let (_dir, mut app) = app_with(true);
        app.switch_tab(Tab::Notes);
        let ws = app.workspace.as_mut().unwrap();
        let target = ws.create_note(NoteDraft::new("Groceries", "- milk")).unwrap();
        let mut source = NoteDraft::new("Plan", "buy [[groceries]]");
        source.folder = Some("Home".into());
        let source = ws.create_note(source).unwrap();
        ws.dispatch_notes(NoteAction::SetFolder(Some("Home".into()))).unwrap();
        ws.dispatch_notes(NoteAction::Select(source)).unwrap();

        app.follow_link().unwrap();
        assert_eq!(app.selected_id(), Some(target));
        assert_eq!(app.workspace.as_ref().unwrap().notes().snapshot().folder, None);
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "alpha", None);
        add_task(&mut app, "beta", None);
        app.enter_search_mode();
        app.search.insert_char('l');
        app.apply_search();
        assert_eq!(app.rows().len(), 1);
        app.exit_search_mode(false);
        assert_eq!(app.rows().len(), 2);
    }

    #[test]
    fn calendar_lists_tasks_due_that_day() {
        let (_dir, mut app) = app_with(true);
        add_task(&mut app, "tomorrow", Some(date(2025, 4, 11)));
        app.switch_tab(Tab::Calendar);
        assert!(app.rows().is_empty());
        app.move_calendar_day(1);
        assert_eq!(app.rows().len(), 1);
        app.move_calendar_month(-1);
        assert_eq!(app.ui.calendar_day, date(2025, 3, 11));
    }

    #[test]
    fn status_message_expires() {
        let (_dir, mut app) = app_with(true);
        app.set_status_message("hi".into());
        app.check_status_message_timeout();
        assert!(app.status.message.is_some());
        app.status.message_time = Instant::now().checked_sub(STATUS_MESSAGE_TIMEOUT);
        app.check_status_message_timeout();
        assert!(app.status.message.is_none());
    }
}
