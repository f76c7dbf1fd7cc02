use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup = popup_area(area, 60, 80);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup);
}

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch tabs\n", key(&kb.tab_left), key(&kb.tab_right)));
    text.push_str(&format!("  {} / {}: Move up/down (days on the calendar)\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!("  {}: Switch between sidebar and list\n", key(&kb.focus_next)));
    text.push_str(&format!("  {}: Open task / follow note link\n", key(&kb.select)));
    text.push_str("  [ / ]: Previous/next month (Calendar)\n");
    text.push_str("  PageUp/PageDown: Scroll details\n\n");

    text.push_str("Tasks:\n");
    text.push_str(&format!(
        "  {} {} {} {}: All / Today / Upcoming / Completed\n",
        key(&kb.filter_all),
        key(&kb.filter_today),
        key(&kb.filter_upcoming),
        key(&kb.filter_completed)
    ));
    text.push_str(&format!("  {}: Toggle completed\n", key(&kb.toggle_complete)));
    text.push_str(&format!("  {}: Toggle starred\n", key(&kb.toggle_star)));
    text.push_str(&format!("  {}: New list\n", key(&kb.new_list)));
    text.push_str(&format!("  {}: Group by priority / folder\n\n", key(&kb.toggle_grouping)));

    text.push_str("Items:\n");
    text.push_str(&format!("  {}: New\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Add tag (-tag removes)\n", key(&kb.add_tag)));
    text.push_str(&format!("  {}: Copy as markdown\n", key(&kb.copy)));
    text.push_str(&format!("  {}: Search\n\n", key(&kb.search)));

    text.push_str("Forms:\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  Space, ←/→: Change priority or list\n");
    text.push_str("  Ctrl+z: Undo\n");
    text.push_str("  Esc: Cancel\n\n");

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Reload from storage\n", key(&kb.refresh)));
    text.push_str(&format!("  {}: Toggle sidebar\n", key(&kb.toggle_sidebar)));
    text.push_str(&format!("  {}: Sign out\n", key(&kb.sign_out)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_follows_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.new_list = "L".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  L: New list"));
        assert!(text.contains("F1: Show/hide help"));
    }
}
