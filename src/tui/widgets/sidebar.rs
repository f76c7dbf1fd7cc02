use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::Config;
use crate::tui::app::SidebarEntry;
use crate::tui::widgets::color::parse_color;

/// Lists (tasks) or folders and tags (notes), each with its count.
pub fn render_sidebar(
    f: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[SidebarEntry],
    state: &mut ListState,
    focused: bool,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let inner_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let count = entry.count.to_string();
            let room = inner_width.saturating_sub(count.len() + 1);
            let label: String = entry.label.chars().take(room).collect();
            let pad = inner_width.saturating_sub(label.chars().count() + count.len());
            ListItem::new(Line::from(vec![
                Span::raw(label),
                Span::raw(" ".repeat(pad)),
                Span::styled(count, Style::default().add_modifier(Modifier::DIM)),
            ]))
        })
        .collect();

    let border_style = if focused {
        Style::default().fg(highlight_bg)
    } else {
        Style::default().fg(fg_color)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()).border_style(border_style))
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, state);
}
