use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use minidrive_core::share::LINK_LIFETIME_NOTE;
use minidrive_core::Page;

use crate::app::{App, AppState, FormFocus};

use super::styles;
use super::tabs::{files, upload};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::Sharing) {
        render_share_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Mini Drive";
    let server = match app.backend_online {
        Some(true) => format!("{} (online)", app.config.api_base),
        Some(false) => format!("{} (unreachable)", app.config.api_base),
        None => app.config.api_base.clone(),
    };
    let help_hint = "[?] Help";
    let right = format!("{}  {}", server, help_hint);

    let server_style = match app.backend_online {
        Some(false) => styles::error_style(),
        _ => styles::muted_style(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2),
        )),
        Span::styled(server, server_style),
        Span::raw("  "),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs: Vec<(&str, bool)> = if app.page.is_protected() {
        vec![
            ("[1] Files", app.page == Page::Files),
            ("[2] Upload", app.page == Page::Upload),
        ]
    } else {
        vec![
            ("Login", app.page == Page::Login),
            ("Sign up", app.page == Page::Signup),
        ]
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    if app.page.is_protected() {
        let logout = "[L]ogout";
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + logout.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(logout, styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.page {
        Page::Files => files::render(frame, app, area),
        Page::Upload => upload::render(frame, app, area),
        Page::Login | Page::Signup => render_auth_form(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.state {
        AppState::Searching => "type to filter | [Enter] keep | [Esc] clear",
        AppState::EditingPath => "[Enter] upload | [Esc] cancel",
        AppState::Sharing => "[c] copy | [Esc] close",
        _ if app.page.is_protected() => "[r]efresh | [/] search | [q]uit",
        _ => "[Tab] next field | [Esc] quit",
    };
    let right_text = format!(" {} ", shortcuts);

    let mut spans = vec![Span::raw(" ")];
    let mut used = 1 + right_text.chars().count();
    if app.is_busy() {
        spans.push(Span::styled("Working… ", styles::muted_style()));
        used += 9;
    }
    for (i, notice) in app.notices.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", styles::muted_style()));
            used += 3;
        }
        used += notice.text.chars().count();
        spans.push(Span::styled(notice.text.clone(), styles::notice_style(notice.severity)));
    }

    spans.push(Span::raw(" ".repeat((area.width as usize).saturating_sub(used))));
    spans.push(Span::styled(right_text, styles::muted_style()));

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Username/password form shared by the login and signup pages.
fn render_auth_form(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(46, 11, area);
    frame.render_widget(Clear, area);

    let field = |label: &str, value: String, focused: bool| {
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{}: [", label), styles::muted_style()),
            Span::styled(format!("{:<20}{}", value, cursor), style),
            Span::styled("]", styles::muted_style()),
        ])
    };

    let button = |label: &str, focused: bool| {
        if focused {
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style())
        } else {
            Span::styled(format!("   {}   ", label), styles::list_item_style())
        }
    };

    let (submit, switch) = if app.page == Page::Signup {
        ("Sign up", "Back to login")
    } else {
        ("Login", "Create an account")
    };

    // Keep the tail of long usernames in view
    let skip = app.username.chars().count().saturating_sub(20);
    let visible_username: String = app.username.chars().skip(skip).collect();
    let masked = "*".repeat(app.password.chars().count().min(20));

    let lines = vec![
        Line::from(""),
        field("Username", visible_username, app.form_focus == FormFocus::Username),
        field("Password", masked, app.form_focus == FormFocus::Password),
        Line::from(""),
        Line::from(vec![
            Span::raw("            ["),
            button(submit, app.form_focus == FormFocus::Submit),
            Span::raw("]"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("        "),
            button(switch, app.form_focus == FormFocus::Switch),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", app.page.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_share_overlay(frame: &mut Frame, app: &App) {
    let Some(ref dialog) = app.share else {
        return;
    };

    let area = centered_rect_fixed(72, 11, frame.area());
    frame.render_widget(Clear, area);

    let link_style = if dialog.is_selected() {
        styles::link_selected_style()
    } else {
        styles::highlight_style()
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" File: ", styles::muted_style()),
            Span::styled(dialog.filename.clone(), styles::list_item_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", dialog.link), link_style)),
        Line::from(""),
        Line::from(vec![
            Span::raw(" ["),
            Span::styled(format!(" {} ", dialog.copy_label()), styles::selected_style()),
            Span::raw("]  "),
            Span::styled("press c", styles::muted_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", LINK_LIFETIME_NOTE), styles::muted_style())),
    ];

    let block = Block::default()
        .title(" Share link ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Mini Drive", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("1/2", "Files / Upload page"),
        key("↑/↓ j/k", "Select file"),
        key("PgUp/PgDn", "Scroll by page"),
        Line::from(""),
        Line::from(Span::styled(" Files", styles::highlight_style())),
        key("d", "Download selected file"),
        key("x", "Delete selected file"),
        key("s", "Share selected file"),
        key("/", "Search by filename"),
        key("r", "Refresh (clears search)"),
        Line::from(""),
        Line::from(Span::styled(" Other", styles::highlight_style())),
        key("u", "Choose a file to upload"),
        key("L", "Log out"),
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

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
