use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::Config;
use crate::partition::TagCount;
use crate::stats::TaskStats;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::task_list::priority_color;

const BAR_WIDTH: usize = 20;

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat((count * BAR_WIDTH).div_ceil(max).min(BAR_WIDTH))
}

fn row(label: &str, value: usize) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{:<12}", label)),
        Span::styled(value.to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ])
}

/// Counts, then per-priority and per-tag bars.
pub fn stats_lines(stats: &TaskStats, note_count: usize, note_tags: &[TagCount]) -> Vec<Line<'static>> {
    let mut lines = vec![
        row("Total", stats.total),
        row("Completed", stats.completed),
        row("Pending", stats.pending),
        row("Overdue", stats.overdue),
        row("Due today", stats.due_today),
        row("Starred", stats.starred),
        row("Notes", note_count),
        Line::default(),
        Line::from(Span::styled("By priority", Style::default().add_modifier(Modifier::BOLD))),
    ];

    let max = stats.by_priority.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (priority, count) in &stats.by_priority {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<12}", priority.to_string())),
            Span::styled(bar(*count, max), Style::default().fg(priority_color(*priority))),
            Span::raw(format!(" {}", count)),
        ]));
    }

    for (title, tags) in [("Task tags", stats.by_tag.as_slice()), ("Note tags", note_tags)] {
        if tags.is_empty() {
            continue;
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))));
        let max = tags.iter().map(|tag| tag.count).max().unwrap_or(0);
        for tag in tags {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<12}", format!("#{}", tag.tag))),
                Span::raw(bar(tag.count, max)),
                Span::raw(format!(" {}", tag.count)),
            ]));
        }
    }
    lines
}

pub fn render_stats(f: &mut Frame, area: Rect, stats: &TaskStats, note_count: usize, note_tags: &[TagCount], config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let [gauge_area, body] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Completion"))
        .gauge_style(Style::default().fg(highlight_bg))
        .percent(u16::from(stats.completion_rate.min(100)));
    f.render_widget(gauge, gauge_area);

    let paragraph = Paragraph::new(stats_lines(stats, note_count, note_tags))
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .style(Style::default().fg(fg_color));
    f.render_widget(paragraph, body);
}
