use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::models::TaskList;
use crate::tui::app::{NoteField, NoteForm, Prompt, TaskField, TaskForm};
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;

fn field_block(label: &str, focused: bool, config: &Config) -> Block<'static> {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let border = if focused {
        Style::default().fg(parse_color(&active_theme.highlight_bg)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(fg_color)
    };
    Block::default()
        .borders(Borders::ALL)
        .title(label.to_string())
        .border_style(border)
        .style(Style::default().fg(fg_color).bg(bg_color))
}

/// A bordered text box. The focused box scrolls to and shows the cursor;
/// `masked` hides the text (passwords).
pub fn render_text_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    editor: &mut Editor,
    focused: bool,
    masked: bool,
    config: &Config,
) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    if inner_height == 0 || inner_width == 0 {
        return;
    }
    editor.update_scroll(inner_height);

    // Horizontal scroll keeps the cursor column on screen.
    let h_offset = if focused {
        editor.cursor_col.saturating_sub(inner_width.saturating_sub(1))
    } else {
        0
    };
    let lines: Vec<Line> = editor
        .visible_lines(inner_height)
        .iter()
        .map(|line| {
            let shown: String = line.chars().skip(h_offset).take(inner_width).collect();
            if masked {
                Line::from("•".repeat(shown.chars().count()))
            } else {
                Line::from(shown)
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(field_block(label, focused, config)), area);

    if focused {
        if let Some((col, row)) = editor.cursor_offset(inner_height) {
            let col = col.saturating_sub(h_offset as u16);
            f.set_cursor_position(Position::new(area.x + 1 + col, area.y + 1 + row));
        }
    }
}

/// A picker that cycles through values with ←/→ or Space.
pub fn render_choice_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool, config: &Config) {
    let line = if focused {
        Line::from(vec![
            Span::raw("◀ "),
            Span::styled(value.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ▶"),
        ])
    } else {
        Line::from(value.to_string())
    };
    f.render_widget(Paragraph::new(line).block(field_block(label, focused, config)), area);
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &mut TaskForm, lists: &[TaskList], config: &Config) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(if form.editing { "Edit Task" } else { "New Task" });
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let [title, description, due, priority, list, tags] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(inner);

    let current = form.current_field;
    let list_name = lists
        .get(form.list_index)
        .map(|list| list.name.as_str())
        .unwrap_or("Inbox");

    render_text_field(f, title, TaskField::Title.label(), &mut form.title, current == TaskField::Title, false, config);
    render_text_field(
        f,
        description,
        TaskField::Description.label(),
        &mut form.description,
        current == TaskField::Description,
        false,
        config,
    );
    render_text_field(f, due, TaskField::DueDate.label(), &mut form.due_date, current == TaskField::DueDate, false, config);
    render_choice_field(
        f,
        priority,
        TaskField::Priority.label(),
        &form.priority.to_string(),
        current == TaskField::Priority,
        config,
    );
    render_choice_field(f, list, TaskField::List.label(), list_name, current == TaskField::List, config);
    render_text_field(f, tags, TaskField::Tags.label(), &mut form.tags, current == TaskField::Tags, false, config);
}

pub fn render_note_form(f: &mut Frame, area: Rect, form: &mut NoteForm, config: &Config) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(if form.editing { "Edit Note" } else { "New Note" });
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let [title, folder, tags, content] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .areas(inner);

    let current = form.current_field;
    render_text_field(f, title, NoteField::Title.label(), &mut form.title, current == NoteField::Title, false, config);
    render_text_field(f, folder, NoteField::Folder.label(), &mut form.folder, current == NoteField::Folder, false, config);
    render_text_field(f, tags, NoteField::Tags.label(), &mut form.tags, current == NoteField::Tags, false, config);
    render_text_field(
        f,
        content,
        NoteField::Content.label(),
        &mut form.content,
        current == NoteField::Content,
        false,
        config,
    );
}

/// One-line input popup (tag, new list).
pub fn render_prompt(f: &mut Frame, area: Rect, prompt: &mut Prompt, config: &Config) {
    let popup = popup_area(area, 50, 20);
    let popup = Rect {
        height: popup.height.min(5).max(3),
        ..popup
    };
    f.render_widget(Clear, popup);

    let [input, hint] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(popup);
    render_text_field(f, input, prompt.kind.title(), &mut prompt.editor, true, false, config);
    f.render_widget(
        Paragraph::new("Enter: apply • Esc: cancel").alignment(Alignment::Center),
        hint,
    );
}
