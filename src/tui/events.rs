use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;
use tracing::debug;

use crate::auth::Route;
use crate::config::KeyBindings;
use crate::filter::TaskFilter;
use crate::tui::App;
use crate::tui::app::{Focus, Mode, PromptKind, Tab};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::editor::Editor;
use crate::utils::{self, parse_key_binding};

/// Restores the terminal when dropped, including on panic. A terminal left in
/// raw mode or the alternate screen is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore explicitly on normal exit; drop is then a no-op.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Checked before entering the alternate screen.
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    loop {
        app.check_status_message_timeout();
        app.tick(utils::today());
        app.sync_list_state();

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(area, app.config.sidebar_width_percent, !app.sidebar_visible());
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(16))? {
            // Only presses; Windows also reports releases.
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    Ok(())
}

/// Handle one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.route {
        Route::Landing => handle_landing(app, key_event),
        Route::SignIn | Route::SignUp => handle_auth_form(app, key_event),
        Route::Dashboard => match app.ui.mode {
            Mode::Help => handle_help_mode(app, key_event),
            Mode::ConfirmDelete => handle_confirm_delete(app, key_event),
            Mode::Search => handle_search_mode(app, key_event),
            Mode::Prompt => handle_prompt_mode(app, key_event),
            Mode::Form => handle_form_mode(app, key_event),
            Mode::View => handle_view_mode(app, key_event),
        },
    }
}

fn handle_landing(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if matches_binding(key_event, &app.config.key_bindings.quit)? {
        return Ok(true);
    }
    match key_event.code {
        KeyCode::Char('i') => app.navigate(Route::SignIn),
        KeyCode::Char('u') => app.navigate(Route::SignUp),
        _ => {}
    }
    Ok(false)
}

fn handle_auth_form(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.navigate(Route::Landing),
        KeyCode::Tab | KeyCode::Down => app.next_auth_field(true),
        KeyCode::BackTab | KeyCode::Up => app.next_auth_field(false),
        KeyCode::Enter => {
            let result = app.submit_auth();
            app.report(result);
        }
        _ => {
            edit_text(app.auth_form.current_editor(), key_event);
        }
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc
        || matches_binding(key_event, &app.config.key_bindings.help)?
        || matches_binding(key_event, &app.config.key_bindings.quit)?
    {
        app.ui.mode = Mode::View;
    }
    Ok(false)
}

fn handle_confirm_delete(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            app.confirm.selection = 1 - app.confirm.selection.min(1);
        }
        KeyCode::Enter => {
            let result = app.confirm_delete();
            app.report(result);
        }
        KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.exit_search_mode(false),
        KeyCode::Enter => app.exit_search_mode(true),
        _ => {
            if edit_text(&mut app.search, key_event) {
                app.apply_search();
            }
        }
    }
    Ok(false)
}

fn handle_prompt_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.close_prompt(),
        KeyCode::Enter => {
            let result = app.submit_prompt();
            app.report(result);
        }
        _ => {
            if let Some(prompt) = app.prompt.as_mut() {
                edit_text(&mut prompt.editor, key_event);
            }
        }
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if matches_binding(key_event, &app.config.key_bindings.save)? {
        let result = app.save_form();
        app.report(result);
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Esc => {
            app.close_form();
            app.set_status_message("Discarded changes".to_string());
        }
        KeyCode::Tab => app.navigate_form_field(true),
        KeyCode::BackTab => app.navigate_form_field(false),
        code => match app.current_form_editor().map(|editor| editor.is_single_line()) {
            // Enter in a one-line field moves on instead of being dropped.
            Some(true) if code == KeyCode::Enter => app.navigate_form_field(true),
            Some(_) => {
                if let Some(editor) = app.current_form_editor() {
                    edit_text(editor, key_event);
                }
            }
            None => match code {
                KeyCode::Left | KeyCode::Up => app.cycle_form_choice(false),
                KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => app.cycle_form_choice(true),
                KeyCode::Enter => app.navigate_form_field(true),
                _ => {}
            },
        },
    }
    Ok(false)
}

/// Apply an editing key to `editor`. Returns `false` for keys it ignores.
fn edit_text(editor: &mut Editor, key_event: KeyEvent) -> bool {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('z') if ctrl => {
            editor.undo();
        }
        KeyCode::Char(_) if ctrl => return false,
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Delete => editor.delete_forward(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Up => editor.move_cursor_up(),
        KeyCode::Down => editor.move_cursor_down(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        _ => return false,
    }
    true
}

/// Something a key binding can trigger in view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    ToggleSidebar,
    FocusNext,
    New,
    Edit,
    Delete,
    Search,
    Select,
    Up,
    Down,
    TabLeft,
    TabRight,
    Filter(TaskFilter),
    ToggleComplete,
    ToggleStar,
    AddTag,
    Copy,
    Refresh,
    NewList,
    ToggleGrouping,
    SignOut,
    Help,
}

/// Bindings in the order they are tried; the first match wins.
fn command_table(bindings: &KeyBindings) -> Vec<(&str, Command)> {
    vec![
        (&bindings.quit, Command::Quit),
        (&bindings.toggle_sidebar, Command::ToggleSidebar),
        (&bindings.focus_next, Command::FocusNext),
        (&bindings.new, Command::New),
        (&bindings.edit, Command::Edit),
        (&bindings.delete, Command::Delete),
        (&bindings.search, Command::Search),
        (&bindings.select, Command::Select),
        (&bindings.list_up, Command::Up),
        (&bindings.list_down, Command::Down),
        (&bindings.tab_left, Command::TabLeft),
        (&bindings.tab_right, Command::TabRight),
        (&bindings.filter_all, Command::Filter(TaskFilter::All)),
        (&bindings.filter_today, Command::Filter(TaskFilter::Today)),
        (&bindings.filter_upcoming, Command::Filter(TaskFilter::Upcoming)),
        (&bindings.filter_completed, Command::Filter(TaskFilter::Completed)),
        (&bindings.toggle_complete, Command::ToggleComplete),
        (&bindings.toggle_star, Command::ToggleStar),
        (&bindings.add_tag, Command::AddTag),
        (&bindings.copy, Command::Copy),
        (&bindings.refresh, Command::Refresh),
        (&bindings.new_list, Command::NewList),
        (&bindings.toggle_grouping, Command::ToggleGrouping),
        (&bindings.sign_out, Command::SignOut),
        (&bindings.help, Command::Help),
    ]
}

fn resolve_command(bindings: &KeyBindings, key_event: KeyEvent) -> Result<Option<Command>, TuiError> {
    for (binding, command) in command_table(bindings) {
        if matches_binding(key_event, binding)? {
            return Ok(Some(command));
        }
    }
    // Arrow keys always move, whatever the letter bindings are.
    Ok(match key_event.code {
        KeyCode::Up => Some(Command::Up),
        KeyCode::Down => Some(Command::Down),
        _ => None,
    })
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let tab = app.ui.current_tab;

    // Keys that only mean something on one tab.
    match (tab, key_event.code) {
        (Tab::Calendar, KeyCode::Char('[')) => {
            app.move_calendar_month(-1);
            return Ok(false);
        }
        (Tab::Calendar, KeyCode::Char(']')) => {
            app.move_calendar_month(1);
            return Ok(false);
        }
        (Tab::Calendar, KeyCode::Home) => {
            app.calendar_to_today();
            return Ok(false);
        }
        (_, KeyCode::PageDown) => {
            app.scroll_detail(5);
            return Ok(false);
        }
        (_, KeyCode::PageUp) => {
            app.scroll_detail(-5);
            return Ok(false);
        }
        _ => {}
    }

    let Some(command) = resolve_command(&app.config.key_bindings, key_event)? else {
        return Ok(false);
    };
    debug!(?command, "key command");

    let result = match command {
        Command::Quit => return Ok(true),
        Command::ToggleSidebar => {
            app.toggle_sidebar();
            Ok(())
        }
        Command::FocusNext => {
            app.toggle_focus();
            Ok(())
        }
        Command::New => {
            app.open_new_form();
            Ok(())
        }
        Command::Edit if tab != Tab::Stats => app.open_edit_form(),
        Command::Delete if tab != Tab::Stats => app.request_delete(),
        Command::Search if tab.shows_tasks() || tab == Tab::Notes => {
            app.enter_search_mode();
            Ok(())
        }
        Command::Select => {
            if app.ui.focus == Focus::Sidebar {
                app.ui.focus = Focus::Items;
                Ok(())
            } else if tab == Tab::Notes {
                app.follow_link()
            } else if tab.shows_tasks() {
                app.open_edit_form()
            } else {
                Ok(())
            }
        }
        Command::Up | Command::Down => {
            let delta = if command == Command::Up { -1 } else { 1 };
            if tab == Tab::Calendar {
                app.move_calendar_day(delta as i64);
            } else if app.ui.focus == Focus::Sidebar {
                app.move_sidebar(delta);
            } else {
                app.move_selection(delta);
            }
            Ok(())
        }
        Command::TabLeft => {
            app.next_tab(false);
            Ok(())
        }
        Command::TabRight => {
            app.next_tab(true);
            Ok(())
        }
        Command::Filter(filter) => {
            app.set_task_filter(filter);
            Ok(())
        }
        Command::ToggleComplete if tab.shows_tasks() => app.toggle_selected_completed(),
        Command::ToggleStar if tab.shows_tasks() => app.toggle_selected_starred(),
        Command::AddTag if tab.shows_tasks() || tab == Tab::Notes => {
            app.open_prompt(PromptKind::Tag);
            Ok(())
        }
        Command::Copy => app.copy_selected(),
        Command::Refresh => app.refresh(),
        Command::NewList => {
            app.open_prompt(PromptKind::NewList);
            Ok(())
        }
        Command::ToggleGrouping => {
            app.toggle_grouping();
            Ok(())
        }
        Command::SignOut => app.sign_out(),
        Command::Help => {
            app.ui.mode = Mode::Help;
            Ok(())
        }
        _ => Ok(()),
    };
    app.report(result);
    Ok(false)
}

fn matches_binding(key_event: KeyEvent, binding: &str) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(parsed.matches(key_event.code, key_event.modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalAuth, SessionProvider};
    use crate::config::Config;
    use crate::database::Database;
    use chrono::NaiveDate;
    use std::rc::Rc;

    fn app(sign_up: bool) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let db = Rc::new(Database::open_in_memory().unwrap());
        let mut auth = LocalAuth::new(Rc::clone(&db), dir.path().join("session.json")).unwrap();
        if sign_up {
            auth.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        }
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let app = App::new(Config::default(), db, auth, today).unwrap();
        (dir, app)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        handle_key_event(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)).unwrap()
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn titles(app: &App) -> Vec<String> {
        let ws = app.workspace.as_ref().unwrap();
        ws.tasks().visible().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn quit_from_landing_and_dashboard() {
        let (_dir, mut landing) = app(false);
        assert!(press(&mut landing, KeyCode::Char('q')));
        let (_dir, mut dashboard) = app(true);
        assert!(press(&mut dashboard, KeyCode::Char('q')));
    }

    #[test]
    fn sign_up_by_keyboard() {
        let (_dir, mut app) = app(false);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.route, Route::SignUp);
        type_str(&mut app, "Grace");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "grace@example.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "hopper!");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route, Route::Dashboard);
    }

    #[test]
    fn q_is_text_inside_forms() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Form);
        assert!(!press(&mut app, KeyCode::Char('q')));
        ctrl(&mut app, 's');
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(titles(&app), vec!["q"]);
    }

    #[test]
    fn failed_save_reports_and_keeps_form() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        ctrl(&mut app, 's');
        assert_eq!(app.ui.mode, Mode::Form);
        assert_eq!(app.status.message.as_deref(), Some("Title is required"));
    }

    #[test]
    fn enter_inserts_newline_only_in_description() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Plan");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "line one");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "line two");
        ctrl(&mut app, 's');
        let ws = app.workspace.as_ref().unwrap();
        let task = ws.tasks().selected().unwrap();
        assert_eq!(task.title, "Plan");
        assert_eq!(task.description.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn priority_field_cycles_with_space() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Urgent");
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char(' '));
        ctrl(&mut app, 's');
        let ws = app.workspace.as_ref().unwrap();
        assert_eq!(ws.tasks().selected().unwrap().priority, crate::models::Priority::High);
    }

    #[test]
    fn search_narrows_then_escape_restores() {
        let (_dir, mut app) = app(true);
        for title in ["milk", "bread"] {
            press(&mut app, KeyCode::Char('n'));
            type_str(&mut app, title);
            ctrl(&mut app, 's');
        }
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "mi");
        assert_eq!(titles(&app), vec!["milk"]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(titles(&app).len(), 2);
    }

    #[test]
    fn filter_keys_switch_filter() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "done soon");
        ctrl(&mut app, 's');
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(titles(&app), vec!["done soon"]);
        press(&mut app, KeyCode::Char('3'));
        assert!(titles(&app).is_empty());
    }

    #[test]
    fn delete_through_dialog() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "gone");
        ctrl(&mut app, 's');
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.ui.mode, Mode::ConfirmDelete);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert!(titles(&app).is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Task deleted"));
    }

    #[test]
    fn delete_without_selection_reports() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.status.message.as_deref(), Some("Nothing is selected"));
    }

    #[test]
    fn help_toggles() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.mode, Mode::View);
    }

    #[test]
    fn tabs_wrap_around() {
        let (_dir, mut app) = app(true);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.ui.current_tab, Tab::Stats);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.ui.current_tab, Tab::Tasks);
    }

    #[test]
    fn sign_out_returns_to_landing() {
        let (_dir, mut app) = app(true);
        ctrl(&mut app, 'o');
        assert_eq!(app.route, Route::Landing);
    }

    #[test]
    fn bad_binding_is_an_error() {
        let (_dir, mut app) = app(true);
        app.config.key_bindings.quit = "Ctrl+".to_string();
        let result = handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(matches!(result, Err(TuiError::KeyBindingError(_))));
    }
}
