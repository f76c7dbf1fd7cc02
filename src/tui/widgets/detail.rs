use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap};
use std::cmp;

use crate::Config;
use crate::markdown::{Document, terminal};
use crate::models::{Note, Task};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::task_list::priority_color;

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

/// Header fields and the rendered description of a task.
pub fn task_lines(task: &Task, list_name: &str, today: NaiveDate, accent: Color) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD).fg(accent),
        )),
        Line::default(),
        field("Status", if task.completed { "Completed" } else { "Open" }.to_string()),
    ];
    if let Some(due) = task.due_date {
        let mut value = due.format("%A, %B %-d, %Y").to_string();
        if task.is_overdue(today) {
            value.push_str(" (overdue)");
        } else if due == today {
            value.push_str(" (today)");
        }
        lines.push(field("Due", value));
    }
    lines.push(Line::from(vec![
        Span::styled("Priority: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(task.priority.to_string(), Style::default().fg(priority_color(task.priority))),
    ]));
    lines.push(field("List", list_name.to_string()));
    if task.starred {
        lines.push(field("Starred", "★".to_string()));
    }
    if !task.tags.is_empty() {
        lines.push(field("Tags", task.tags.format_brackets()));
    }
    lines.push(field("Updated", task.updated_at.format("%Y-%m-%d %H:%M").to_string()));

    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::default());
        lines.extend(terminal::to_lines(&Document::parse(description), accent));
    }
    lines
}

/// Header fields and the rendered markdown body of a note.
pub fn note_lines(note: &Note, accent: Color) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            note.title.clone(),
            Style::default().add_modifier(Modifier::BOLD).fg(accent),
        )),
        field("Folder", note.folder_name().to_string()),
    ];
    if !note.tags.is_empty() {
        lines.push(field("Tags", note.tags.format_brackets()));
    }
    lines.push(field("Updated", note.updated_at.format("%Y-%m-%d %H:%M").to_string()));
    lines.push(Line::default());
    lines.extend(terminal::to_lines(&Document::parse(&note.content), accent));
    lines
}

/// Scrollable detail pane. `lines` empty shows `placeholder` instead.
pub fn render_detail(
    f: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    placeholder: &str,
    scroll_offset: u16,
    config: &Config,
) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let fg_color = parse_color(&config.get_active_theme().fg);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    if lines.is_empty() {
        let paragraph = Paragraph::new(placeholder.to_string())
            .block(block)
            .style(Style::default().fg(fg_color).add_modifier(Modifier::DIM));
        f.render_widget(paragraph, area);
        return;
    }

    let [content_area, scrollbar_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(area);

    let viewport_height = content_area.height.saturating_sub(2) as usize;
    let total_lines = lines.len();
    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll = cmp::min(scroll_offset as usize, max_scroll);

    // Keep indentation of nested lists
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .style(Style::default().fg(fg_color))
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let track = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_area.height.saturating_sub(2),
        );
        let mut state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll);
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, track, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn overdue_task_is_marked() {
        let mut task = Task::new("u1", "File taxes".into());
        task.due_date = NaiveDate::from_ymd_opt(2025, 4, 1);
        task.description = Some("**soon**".into());
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let text = plain(&task_lines(&task, "Inbox", today, Color::Cyan));
        assert!(text.contains(&"Due: Tuesday, April 1, 2025 (overdue)".to_string()));
        assert!(text.contains(&"List: Inbox".to_string()));
        assert_eq!(text.last().map(String::as_str), Some("soon"));
    }

    #[test]
    fn note_body_follows_header() {
        let note = Note::new("u1", "Ideas".into(), "# Big\n- one".into());
        let text = plain(&note_lines(&note, Color::Cyan));
        assert_eq!(text[0], "Ideas");
        assert_eq!(text[1], "Folder: Unfiled");
        assert!(text.contains(&"# Big".to_string()));
        assert!(text.contains(&"• one".to_string()));
    }
}
