use chrono::{Datelike, NaiveDate};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::Config;
use crate::calendar::{MonthGrid, WEEKDAY_LABELS, tasks_due_on};
use crate::models::Task;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::task_list::task_line;

/// Month grid lines. Days with open tasks get a dot; `selected` is
/// highlighted and `today` underlined.
pub fn month_lines(
    grid: &MonthGrid,
    tasks: &[Task],
    selected: NaiveDate,
    today: NaiveDate,
    highlight: Style,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(
        WEEKDAY_LABELS
            .iter()
            .map(|label| format!(" {} ", label))
            .collect::<String>(),
    )];
    for week in &grid.weeks {
        let spans: Vec<Span> = week
            .iter()
            .map(|cell| match cell {
                None => Span::raw("    "),
                Some(day) => {
                    let busy = tasks_due_on(tasks, *day).iter().any(|task| !task.completed);
                    let text = format!("{:>3}{}", day.day(), if busy { "•" } else { " " });
                    let mut style = Style::default();
                    if *day == selected {
                        style = highlight;
                    }
                    if *day == today {
                        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                    }
                    Span::styled(text, style)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

pub fn render_calendar(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    selected: NaiveDate,
    today: NaiveDate,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight = Style::default()
        .fg(parse_color(&active_theme.highlight_fg))
        .bg(parse_color(&active_theme.highlight_bg));

    let [grid_area, day_area] = Layout::horizontal([Constraint::Length(30), Constraint::Min(10)]).areas(area);

    let grid = MonthGrid::containing(selected);
    let paragraph = Paragraph::new(month_lines(&grid, tasks, selected, today, highlight))
        .block(Block::default().borders(Borders::ALL).title(grid.title()))
        .style(Style::default().fg(fg_color));
    f.render_widget(paragraph, grid_area);

    let max_width = day_area.width.saturating_sub(4) as usize;
    let due = tasks_due_on(tasks, selected);
    let items: Vec<ListItem> = if due.is_empty() {
        vec![ListItem::new("Nothing due").style(Style::default().add_modifier(Modifier::DIM))]
    } else {
        due.iter()
            .map(|task| ListItem::new(task_line(task, today, max_width)))
            .collect()
    };
    let title = selected.format("%A, %B %-d").to_string();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color));
    f.render_widget(list, day_area);
}
