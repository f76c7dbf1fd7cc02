use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;

/// One entry of the filter bar; `active` entries are highlighted.
pub struct FilterChip {
    pub label: String,
    pub active: bool,
}

pub fn render_filter_bar(f: &mut Frame, area: Rect, title: &str, chips: &[FilterChip], summary: &str, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);

    let mut spans = Vec::new();
    for chip in chips {
        let style = if chip.active {
            Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg_color)
        };
        spans.push(Span::styled(format!(" {} ", chip.label), style));
        spans.push(Span::raw(" "));
    }
    if !summary.is_empty() {
        spans.push(Span::styled(summary.to_string(), Style::default().add_modifier(Modifier::DIM)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color));
    f.render_widget(paragraph, area);
}

/// The live search box shown in place of the filter bar.
pub fn render_search_box(f: &mut Frame, area: Rect, editor: &Editor, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let prefix = "Search: ";
    let paragraph = Paragraph::new(format!("{}{}", prefix, editor.text()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Enter: keep • Esc: clear")
                .border_style(Style::default().fg(highlight_bg))
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color));
    f.render_widget(paragraph, area);

    if let Some((col, _)) = editor.cursor_offset(1) {
        let x = area.x + 1 + prefix.len() as u16 + col;
        if x < area.right().saturating_sub(1) {
            f.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}
