use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;
use crate::ui::tabs::files::render_file_table;

/// Render the Upload page: file path input above the current listing.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    render_upload_form(frame, app, chunks[0]);
    render_file_table(frame, app, chunks[1], !matches!(app.state, AppState::EditingPath));
}

fn render_upload_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = matches!(app.state, AppState::EditingPath);
    let cursor = if editing { "▌" } else { "" };

    let path_line = if app.upload_path.is_empty() && !editing {
        Line::from(Span::styled(" No file chosen", styles::muted_style()))
    } else {
        Line::from(vec![
            Span::styled(" File: ", styles::muted_style()),
            Span::styled(format!("{}{}", app.upload_path, cursor), styles::list_item_style()),
        ])
    };

    let hint = if editing {
        " [Enter] upload  [Esc] cancel"
    } else {
        " [u] choose a file and upload"
    };

    let lines = vec![
        path_line,
        Line::from(""),
        Line::from(Span::styled(hint, styles::muted_style())),
    ];

    let block = Block::default()
        .title(" Upload ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
