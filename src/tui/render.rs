use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::auth::Route;
use crate::filter::TaskFilter;
use crate::partition::{ListSelector, tag_index};
use crate::stats::TaskStats;
use crate::tui::app::{Focus, Form, Mode, Tab};
use crate::tui::{App, Layout};
use crate::tui::widgets::{
    auth_screen::{render_auth_form, render_landing},
    calendar_view::render_calendar,
    color::parse_color,
    confirm_delete::render_confirm_delete,
    detail::{note_lines, render_detail, task_lines},
    filter_bar::{FilterChip, render_filter_bar, render_search_box},
    form::{render_note_form, render_prompt, render_task_form},
    help::render_help,
    item_list::{ItemListProps, render_item_list},
    sidebar::render_sidebar,
    stats_view::render_stats,
    status_bar::render_status_bar,
    tabs::render_tabs,
};
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let title = match app.workspace.as_ref() {
        Some(ws) => format!("Tasks & Notes · {}", ws.user().name),
        None => "Tasks & Notes".to_string(),
    };
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    match app.route {
        Route::Landing => render_landing(f, layout.inner_area, &app.config),
        Route::SignIn | Route::SignUp => {
            render_auth_form(f, layout.inner_area, app.route, &mut app.auth_form, &app.config)
        }
        Route::Dashboard => render_dashboard(f, app, layout),
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_deref(), &key_hints, &app.config);
}

fn render_dashboard(f: &mut Frame, app: &mut App, layout: &Layout) {
    render_tabs(f, layout.tabs_area, app.ui.current_tab, &app.config);

    if app.sidebar_visible() && layout.sidebar_area.width > 0 {
        let entries = app.sidebar_entries();
        let title = if app.ui.current_tab == Tab::Notes { "Folders & Tags" } else { "Lists" };
        let focused = app.ui.focus == Focus::Sidebar;
        render_sidebar(
            f,
            layout.sidebar_area,
            title,
            &entries,
            &mut app.ui.sidebar_list_state,
            focused,
            &app.config,
        );
    }

    match app.ui.current_tab {
        Tab::Calendar => render_calendar_tab(f, app, layout),
        Tab::Stats => render_stats_tab(f, app, layout),
        Tab::Tasks | Tab::Today | Tab::Notes => render_items_tab(f, app, layout),
    }

    if app.ui.mode == Mode::Search {
        render_search_box(f, layout.filter_area, &app.search, &app.config);
    } else {
        render_filter_row(f, app, layout);
    }

    if let (Some(form), Some(ws)) = (app.form.as_mut(), app.workspace.as_ref()) {
        match form {
            Form::Task(task_form) => {
                render_task_form(f, layout.content_area(), task_form, ws.lists(), &app.config)
            }
            Form::Note(note_form) => render_note_form(f, layout.content_area(), note_form, &app.config),
        }
    }
    if let Some(prompt) = app.prompt.as_mut() {
        render_prompt(f, layout.inner_area, prompt, &app.config);
    }
    if app.ui.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }
    if let Some(target) = app.confirm.target.as_ref() {
        render_confirm_delete(f, f.area(), target, app.confirm.selection, &app.config);
    }
}

fn render_items_tab(f: &mut Frame, app: &mut App, layout: &Layout) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let accent = parse_color(&app.config.get_active_theme().highlight_bg);
    let today = ws.tasks().today();
    let is_notes = app.ui.current_tab == Tab::Notes;

    let (title, empty_message, detail_title, detail) = if is_notes {
        let view = ws.notes();
        (
            format!("Notes ({}/{})", view.visible().len(), view.notes().len()),
            "No notes. Press n to write one.",
            "Note",
            view.selected().map(|note| note_lines(note, accent)).unwrap_or_default(),
        )
    } else {
        let view = ws.tasks();
        let heading = match (app.ui.current_tab, view.list()) {
            (Tab::Today, _) => "Today".to_string(),
            (_, ListSelector::All) => "Tasks".to_string(),
            (_, ListSelector::Smart(smart)) => smart.label().to_string(),
            (_, ListSelector::List(id)) => ws.list_name(id).to_string(),
        };
        (
            format!("{} ({}/{})", heading, view.visible().len(), view.tasks().len()),
            "No tasks here. Press n to add one.",
            "Task",
            view.selected()
                .map(|task| task_lines(task, ws.list_name(&task.list_id), today, accent))
                .unwrap_or_default(),
        )
    };

    let focused = app.ui.focus == Focus::Items;
    let mut list_state = app.ui.list_state.clone();
    {
        let rows = app.rows();
        let props = ItemListProps {
            title,
            rows: &rows,
            today,
            focused,
            empty_message,
        };
        render_item_list(f, layout.list_area, props, &mut list_state, &app.config);
    }
    app.ui.list_state = list_state;

    let placeholder = if is_notes { "Select a note to read it." } else { "Select a task to see its details." };
    render_detail(
        f,
        layout.detail_area,
        detail_title,
        detail,
        placeholder,
        app.ui.detail_scroll,
        &app.config,
    );
}

fn render_calendar_tab(f: &mut Frame, app: &App, layout: &Layout) {
    if let Some(ws) = app.workspace.as_ref() {
        render_calendar(
            f,
            layout.content_area(),
            ws.tasks().tasks(),
            app.ui.calendar_day,
            ws.tasks().today(),
            &app.config,
        );
    }
}

fn render_stats_tab(f: &mut Frame, app: &App, layout: &Layout) {
    if let Some(ws) = app.workspace.as_ref() {
        let stats = TaskStats::compute(ws.tasks().tasks(), ws.tasks().today());
        let notes = ws.notes().notes();
        render_stats(f, layout.content_area(), &stats, notes.len(), &tag_index(notes), &app.config);
    }
}

fn render_filter_row(f: &mut Frame, app: &App, layout: &Layout) {
    let Some(ws) = app.workspace.as_ref() else {
        return;
    };
    let keys = &app.config.key_bindings;
    match app.ui.current_tab {
        Tab::Tasks => {
            let view = ws.tasks();
            let bindings = [&keys.filter_all, &keys.filter_today, &keys.filter_upcoming, &keys.filter_completed];
            let chips: Vec<FilterChip> = TaskFilter::ALL
                .iter()
                .zip(bindings)
                .map(|(filter, key)| FilterChip {
                    label: format!("{} {}", format_key_binding_for_display(key), filter.label()),
                    active: *filter == view.filter(),
                })
                .collect();
            let search = view.snapshot().search;
            let summary = if search.is_empty() { String::new() } else { format!("search: {}", search) };
            render_filter_bar(f, layout.filter_area, "Filter", &chips, &summary, &app.config);
        }
        Tab::Today => {
            let summary = format!("{} due today or overdue", ws.tasks().visible().len());
            render_filter_bar(f, layout.filter_area, "Today", &[], &summary, &app.config);
        }
        Tab::Notes => {
            let snapshot = ws.notes().snapshot();
            let chips = vec![
                FilterChip {
                    label: format!("Folder: {}", snapshot.folder.unwrap_or("all")),
                    active: snapshot.folder.is_some(),
                },
                FilterChip {
                    label: match snapshot.tag {
                        Some(tag) => format!("Tag: #{}", tag),
                        None => "Tag: any".to_string(),
                    },
                    active: snapshot.tag.is_some(),
                },
            ];
            let summary = if snapshot.search.is_empty() {
                String::new()
            } else {
                format!("search: {}", snapshot.search)
            };
            render_filter_bar(f, layout.filter_area, "Filter", &chips, &summary, &app.config);
        }
        Tab::Calendar => {
            let summary = app.ui.calendar_day.format("%A, %B %-d, %Y").to_string();
            render_filter_bar(f, layout.filter_area, "Calendar", &[], &summary, &app.config);
        }
        Tab::Stats => {
            let summary = format!("as of {}", ws.tasks().today().format("%Y-%m-%d"));
            render_filter_bar(f, layout.filter_area, "Stats", &[], &summary, &app.config);
        }
    }
}

fn get_key_hints(app: &App) -> Vec<String> {
    let keys = &app.config.key_bindings;
    let key = format_key_binding_for_display;

    match app.route {
        Route::Landing => {
            return vec![
                "i: Sign in".to_string(),
                "u: Sign up".to_string(),
                format!("{}: Quit", key(&keys.quit)),
            ];
        }
        Route::SignIn | Route::SignUp => {
            return vec![
                "Tab: Next field".to_string(),
                "Enter: Submit".to_string(),
                "Esc: Back".to_string(),
            ];
        }
        Route::Dashboard => {}
    }

    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&keys.help))],
        Mode::Search => vec!["Enter: Keep search".to_string(), "Esc: Clear search".to_string()],
        Mode::ConfirmDelete => vec![
            "←/→: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::Prompt => vec!["Enter: Apply".to_string(), "Esc: Cancel".to_string()],
        Mode::Form => vec![
            "Tab/Shift+Tab: Fields".to_string(),
            "←/→: Change choice".to_string(),
            format!("{}: Save", key(&keys.save)),
            "Ctrl+z: Undo".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", key(&keys.quit))];
            match app.ui.current_tab {
                Tab::Tasks | Tab::Today => {
                    hints.push(format!("{}: New", key(&keys.new)));
                    hints.push(format!("{}: Edit", key(&keys.edit)));
                    hints.push(format!("{}: Done", key(&keys.toggle_complete)));
                    hints.push(format!("{}: Star", key(&keys.toggle_star)));
                    hints.push(format!("{}: Tag", key(&keys.add_tag)));
                    hints.push(format!("{}: Delete", key(&keys.delete)));
                    hints.push(format!("{}: Search", key(&keys.search)));
                    hints.push(format!("{}: Group", key(&keys.toggle_grouping)));
                }
                Tab::Notes => {
                    hints.push(format!("{}: New", key(&keys.new)));
                    hints.push(format!("{}: Edit", key(&keys.edit)));
                    hints.push(format!("{}: Follow link", key(&keys.select)));
                    hints.push(format!("{}: Copy", key(&keys.copy)));
                    hints.push(format!("{}: Tag", key(&keys.add_tag)));
                    hints.push(format!("{}: Delete", key(&keys.delete)));
                    hints.push(format!("{}: Search", key(&keys.search)));
                }
                Tab::Calendar => {
                    hints.push(format!("{}/{}: Day", key(&keys.list_up), key(&keys.list_down)));
                    hints.push("[/]: Month".to_string());
                    hints.push("Home: Today".to_string());
                }
                Tab::Stats => {
                    hints.push(format!("{}: Refresh", key(&keys.refresh)));
                }
            }
            if app.ui.current_tab.has_sidebar() {
                hints.push(format!("{}: Sidebar", key(&keys.toggle_sidebar)));
            }
            if app.ui.current_tab == Tab::Tasks {
                hints.push(format!("{}: New list", key(&keys.new_list)));
            }
            hints.push(format!("{}: Sign out", key(&keys.sign_out)));
            hints.push(format!("{}: Help", key(&keys.help)));
            hints
        }
    }
}
