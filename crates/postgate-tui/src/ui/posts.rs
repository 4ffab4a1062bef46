use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use postgate_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Actions + error
            Constraint::Min(3),    // Post list
        ])
        .split(area);

    render_actions(frame, app, chunks[0]);
    render_post_list(frame, app, chunks[1]);
}

fn render_actions(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::raw(" "),
        Span::styled("[f]", styles::help_key_style()),
        Span::styled(" Fetch Posts   ", styles::help_desc_style()),
        Span::styled("[r]", styles::help_key_style()),
        Span::styled(" Refresh Token   ", styles::help_desc_style()),
        Span::styled("[l]", styles::help_key_style()),
        Span::styled(" Logout", styles::help_desc_style()),
    ])];

    if let Some(error) = app.error_message() {
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(" Post Operations ")
        .title_style(styles::title_style())
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_post_list(frame: &mut Frame, app: &App, area: Rect) {
    let posts = app.posts();
    let max_width = (area.width as usize).saturating_sub(4);

    let block = Block::default()
        .title(format!(" Posts ({}) ", posts.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if posts.is_empty() {
        let hint = if app.controller.is_authenticated() {
            "No posts loaded. Press [f] to fetch."
        } else {
            "Not logged in."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(hint, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let style = if i == app.post_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(format!(
                " • {}",
                truncate_string(post.display_title(), max_width)
            )))
            .style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.post_selection));

    frame.render_stateful_widget(list, area, &mut state);
}
