use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
};

use crate::Config;
use crate::tui::app::ListRow;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::note_list::note_line;
use crate::tui::widgets::task_list::task_line;

pub struct ItemListProps<'a> {
    pub title: String,
    pub rows: &'a [ListRow<'a>],
    pub today: NaiveDate,
    pub focused: bool,
    pub empty_message: &'a str,
}

pub fn render_item_list(f: &mut Frame, area: Rect, props: ItemListProps<'_>, list_state: &mut ListState, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let header_color = parse_color(&active_theme.tab_bg);
    let max_width = area.width.saturating_sub(4) as usize;

    let border_style = if props.focused {
        Style::default().fg(highlight_bg)
    } else {
        Style::default().fg(fg_color)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(props.title)
        .border_style(border_style);

    if props.rows.is_empty() {
        let list = List::new(vec![ListItem::new(Line::from(props.empty_message.to_string()))])
            .block(block)
            .style(Style::default().fg(fg_color).add_modifier(Modifier::DIM));
        f.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = props
        .rows
        .iter()
        .map(|row| match row {
            ListRow::Header(name) => ListItem::new(Line::from(name.to_string()))
                .style(Style::default().fg(header_color).add_modifier(Modifier::BOLD)),
            ListRow::Task(task) => ListItem::new(task_line(task, props.today, max_width)),
            ListRow::Note(note) => ListItem::new(note_line(note, max_width)),
        })
        .collect();
    let total_items = items.len();

    let [list_area, scrollbar_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(area);

    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items > visible_items && list_area.height > 2 {
        let track = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(list_state.offset());
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, track, &mut scrollbar_state);
    }
}
