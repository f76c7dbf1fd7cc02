use chrono::NaiveDate;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Priority, Task};

/// One list row for a task: status, star, priority, title, due date, tags.
pub fn task_line(task: &Task, today: NaiveDate, max_width: usize) -> Line<'static> {
    let status = if task.completed { "✓ " } else { "○ " };
    let star = if task.starred { "★ " } else { "" };
    let priority = match task.priority {
        Priority::High => "!!! ",
        Priority::Medium => "!! ",
        Priority::Low => "! ",
        Priority::None => "",
    };
    let title_style = if task.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(status),
        Span::styled(star, Style::default().fg(Color::Yellow)),
        Span::styled(priority, Style::default().fg(priority_color(task.priority))),
        Span::styled(task.title.clone(), title_style),
    ];
    if let Some(due) = task.due_date {
        let style = if task.is_overdue(today) {
            Style::default().fg(Color::Red)
        } else if due == today {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(format!(" [{}]", due.format("%Y-%m-%d")), style));
    }
    if !task.tags.is_empty() {
        spans.push(Span::styled(
            format!(" {}", task.tags.format_hashes()),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    truncate_spans(spans, max_width)
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Blue,
        Priority::None => Color::Reset,
    }
}

/// Cut a line to `max_width` chars, ending it with "..." when cut.
pub fn truncate_spans(spans: Vec<Span<'static>>, max_width: usize) -> Line<'static> {
    let total: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if total <= max_width {
        return Line::from(spans);
    }
    let mut budget = max_width.saturating_sub(3);
    let mut kept = Vec::new();
    for span in spans {
        if budget == 0 {
            break;
        }
        let len = span.content.chars().count();
        if len <= budget {
            budget -= len;
            kept.push(span);
        } else {
            let cut: String = span.content.chars().take(budget).collect();
            kept.push(Span::styled(cut, span.style));
            budget = 0;
        }
    }
    kept.push(Span::raw("..."));
    Line::from(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shows_markers_and_due_date() {
        let mut task = Task::new("u1", "Pay rent".into());
        task.starred = true;
        task.priority = Priority::High;
        task.due_date = NaiveDate::from_ymd_opt(2025, 4, 1);
        task.tags.insert("home");
        let line = task_line(&task, NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(), 80);
        assert_eq!(text(&line), "○ ★ !!! Pay rent [2025-04-01] #home");
        let due = line.spans.iter().find(|s| s.content.contains("2025")).unwrap();
        assert_eq!(due.style.fg, Some(Color::Red));
    }

    #[test]
    fn long_lines_are_cut() {
        let task = Task::new("u1", "a very long task title".into());
        let line = task_line(&task, NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(), 12);
        assert_eq!(text(&line), "○ a very ...");
    }
}
