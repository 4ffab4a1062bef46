use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus};

use super::posts;
use super::styles;

/// Width of the visible part of the login input fields
const FIELD_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Auth System / {}", app.view.title());
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if app.showing_login_form() {
        render_login_form(frame, app, area);
    } else {
        posts::render(frame, app, area);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.showing_login_form() {
        "[Tab] next field | [Esc] quit"
    } else {
        "[f]etch | [r]efresh | [l]ogout | [q]uit"
    };

    let (left_text, left_style) = match (app.error_hint(), &app.status_message) {
        _ if app.is_busy() => (" Working... ".to_string(), styles::highlight_style()),
        (Some(hint), _) => (format!(" {} ", hint), styles::error_style()),
        (None, Some(msg)) if app.error_message().is_none() => {
            (format!(" {} ", msg), styles::success_style())
        }
        _ => match app.controller.token_age_display() {
            Some(age) => (format!(" Token issued {} ", age), styles::muted_style()),
            None => (" Not logged in ".to_string(), styles::muted_style()),
        },
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

/// Visible tail of a field value, so the cursor end stays in view
fn field_tail(value: &str, width: usize) -> String {
    let len = value.chars().count();
    value.chars().skip(len.saturating_sub(width)).collect()
}

fn render_login_form(frame: &mut Frame, app: &App, area: Rect) {
    let error = app.error_message();
    let height = if error.is_some() { 11 } else { 9 };
    let form_area = centered_rect_fixed(48, height, area);

    let mut lines = vec![Line::from("")];

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if username_focused { "▌" } else { " " };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", field_tail(&app.login_username, FIELD_WIDTH), cursor, width = FIELD_WIDTH),
            username_style,
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let masked = "*".repeat(app.login_password.chars().count().min(FIELD_WIDTH));
    let cursor = if password_focused { "▌" } else { " " };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{:<width$}{}", masked, cursor, width = FIELD_WIDTH), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let (label, button_style) = if button_focused {
        (" ▶ Login ◀ ", styles::selected_style())
    } else {
        ("   Login   ", styles::list_item_style())
    };
    lines.push(Line::from(vec![
        Span::raw("                ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(" Login ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), form_area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 18, frame.area());
    frame.render_widget(Clear, area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            format!("  postgate {}", env!("CARGO_PKG_VERSION")),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Login", styles::highlight_style())),
        key("Tab/↓", "Next field"),
        key("S-Tab/↑", "Previous field"),
        key("Enter", "Next field / submit"),
        Line::from(""),
        Line::from(Span::styled(" Posts", styles::highlight_style())),
        key("f", "Fetch posts"),
        key("r", "Refresh token"),
        key("l", "Log out"),
        key("↑/↓", "Navigate list"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
