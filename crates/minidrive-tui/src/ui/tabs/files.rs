use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use minidrive_core::listing::ActionKind;

use crate::app::{App, AppState};
use crate::ui::styles;

/// Render the Files page: search bar above the file table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_search_bar(frame, app, chunks[0]);
    render_file_table(frame, app, chunks[1], true);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);
    let cursor = if searching { "▌" } else { "" };

    let line = if app.search_query.is_empty() && !searching {
        Line::from(Span::styled(" Press / to search by filename", styles::muted_style()))
    } else {
        Line::from(vec![
            Span::styled(" Search: ", styles::muted_style()),
            Span::styled(format!("{}{}", app.search_query, cursor), styles::search_style()),
        ])
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// File table with per-row actions. Shared with the Upload page.
pub fn render_file_table(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let header = Row::new([
        Cell::from("Filename"),
        Cell::from("Uploaded"),
        Cell::from("Actions"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .view
        .visible_rows()
        .enumerate()
        .map(|(i, (_, row))| {
            let style = if i == app.selection && focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let actions = row
                .actions
                .iter()
                .map(|action| action_label(action.kind))
                .collect::<Vec<_>>()
                .join(" ");

            Row::new(vec![
                Cell::from(row.filename.clone()),
                Cell::from(row.uploaded.clone()),
                Cell::from(actions),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Length(20),
        Constraint::Length(32),
    ];

    let title = if app.view.query().is_empty() {
        format!(" Files ({}) ", app.view.len())
    } else {
        format!(" Files ({} of {}) ", app.view.visible_len(), app.view.len())
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.view.visible_len() == 0 {
        let message = if app.view.is_empty() {
            " No files yet."
        } else {
            " No files match your search."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if focused {
        state.select(Some(app.selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// "[d] Download" style label for a row action.
fn action_label(kind: ActionKind) -> String {
    format!("[{}] {}", kind.key(), kind.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        let labels: Vec<String> = ActionKind::ALL.iter().map(|&k| action_label(k)).collect();
        assert_eq!(labels, ["[d] Download", "[x] Delete", "[s] Share"]);
    }
}
