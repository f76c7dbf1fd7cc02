use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::auth::Route;
use crate::tui::app::{AuthField, AuthForm};
use crate::tui::layout::popup_area;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::form::render_text_field;

pub fn render_landing(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let accent = parse_color(&active_theme.highlight_bg);

    let lines = vec![
        Line::from(Span::styled(
            "Tasks & Notes",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Plan your day, keep your notes, find both fast."),
        Line::default(),
        Line::from(vec![Span::styled("i", Style::default().fg(accent)), Span::raw(" Sign in")]),
        Line::from(vec![Span::styled("u", Style::default().fg(accent)), Span::raw(" Sign up")]),
        Line::from(vec![Span::styled("q", Style::default().fg(accent)), Span::raw(" Quit")]),
    ];

    let popup = popup_area(area, 60, 50);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(fg_color)),
        popup,
    );
}

/// Sign-in or sign-up form, depending on `route`.
pub fn render_auth_form(f: &mut Frame, area: Rect, route: Route, form: &mut AuthForm, config: &Config) {
    let fields = AuthForm::fields(route);
    let title = if route == Route::SignUp { "Sign Up" } else { "Sign In" };

    let popup = popup_area(area, 60, 70);
    f.render_widget(Clear, popup);
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::vertical(constraints).split(inner);

    let current = form.current_field;
    for (field, row) in fields.iter().zip(rows.iter()) {
        let editor = match field {
            AuthField::Name => &mut form.name,
            AuthField::Email => &mut form.email,
            AuthField::Password => &mut form.password,
        };
        let masked = *field == AuthField::Password;
        render_text_field(f, *row, field.label(), editor, *field == current, masked, config);
    }

    let switch = if route == Route::SignUp {
        "Esc back • Enter create account"
    } else {
        "Esc back • Enter sign in"
    };
    if let Some(footer) = rows.last() {
        f.render_widget(Paragraph::new(switch).alignment(Alignment::Center), *footer);
    }
}
