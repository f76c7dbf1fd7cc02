use ratatui::layout::{Constraint, Direction, Flex, Layout as RatLayout, Rect};

pub struct Layout {
    /// Inside the outer border.
    pub inner_area: Rect,
    pub tabs_area: Rect,
    pub sidebar_area: Rect,
    pub list_area: Rect,
    pub detail_area: Rect,
    pub filter_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Smallest usable terminal inside the outer border: a 25 column sidebar
    /// plus room for the list, and tabs + 3 content rows + filter bar + status.
    pub const MIN_WIDTH: u16 = 38;
    pub const MIN_HEIGHT: u16 = 10;

    const SIDEBAR_MIN: u16 = 20;
    const SIDEBAR_MAX_PERCENT: u16 = 40;

    pub fn calculate(size: Rect, sidebar_width_percent: u16, sidebar_collapsed: bool) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let inner_area = Rect::new(size.x + 1, size.y + 1, width - 2, height - 2);

        let sidebar_width = if sidebar_collapsed {
            0
        } else {
            let requested = inner_area.width * sidebar_width_percent / 100;
            let max = inner_area.width * Self::SIDEBAR_MAX_PERCENT / 100;
            requested
                .max(Self::SIDEBAR_MIN)
                .min(max)
                .min(inner_area.width.saturating_sub(10))
        };

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(sidebar_width),
                Constraint::Percentage(45),
                Constraint::Min(1),
            ])
            .split(vertical[1]);

        Self {
            inner_area,
            tabs_area: vertical[0],
            sidebar_area: horizontal[0],
            list_area: horizontal[1],
            detail_area: horizontal[2],
            filter_area: vertical[2],
            status_area: vertical[3],
        }
    }

    /// The list and detail panes together, for views that use the whole width.
    pub fn content_area(&self) -> Rect {
        self.list_area.union(self.detail_area)
    }
}

/// A centered rect taking the given percentages of `area`.
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = RatLayout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = RatLayout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_sidebar_has_no_width() {
        let layout = Layout::calculate(Rect::new(0, 0, 120, 40), 25, true);
        assert_eq!(layout.sidebar_area.width, 0);
        assert_eq!(layout.content_area().width, 118);
    }

    #[test]
    fn rows_stack_up() {
        let layout = Layout::calculate(Rect::new(0, 0, 100, 30), 25, false);
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.filter_area.height, 3);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.sidebar_area.height, 28 - 5);
        assert_eq!(layout.sidebar_area.width, 24);
    }

    #[test]
    fn tiny_terminal_is_padded_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), 25, false);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
        assert!(layout.sidebar_area.width <= Layout::MIN_WIDTH - 10);
    }

    #[test]
    fn popup_is_centered() {
        let popup = popup_area(Rect::new(0, 0, 100, 40), 50, 50);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }
}
