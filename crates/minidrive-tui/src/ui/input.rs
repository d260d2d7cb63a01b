//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use minidrive_core::listing::ActionKind;
use minidrive_core::Page;

use crate::app::{
    can_add_password_char, can_add_path_char, can_add_username_char, App, AppState, FormFocus,
    PAGE_SCROLL_SIZE,
};

/// Handle one key press.
pub fn handle_input(app: &mut App, key: KeyEvent) {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
        }
        AppState::Sharing => handle_share_input(app, key),
        AppState::Searching => handle_search_input(app, key),
        AppState::EditingPath => handle_path_input(app, key),
        AppState::Quitting => {}
        AppState::Normal if app.page.is_protected() => handle_page_input(app, key),
        AppState::Normal => handle_form_input(app, key),
    }
}

/// Keys on the files and upload pages.
fn handle_page_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::Quitting,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.navigate(Page::Files),
        KeyCode::Char('2') => app.navigate(Page::Upload),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('/') => app.state = AppState::Searching,
        KeyCode::Char('u') | KeyCode::Char('i') if app.page == Page::Upload => {
            app.state = AppState::EditingPath;
        }
        KeyCode::Char('d') => app.run_action(ActionKind::Download),
        KeyCode::Char('x') | KeyCode::Delete => app.run_action(ActionKind::Delete),
        KeyCode::Char('s') => app.run_action(ActionKind::Share),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.selection = 0,
        KeyCode::End => app.select_next(usize::MAX / 2),
        KeyCode::Esc if !app.search_query.is_empty() => app.set_search(String::new()),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.set_search(String::new());
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.search_query.clone();
            query.pop();
            app.set_search(query);
        }
        KeyCode::Char(c) => {
            let mut query = app.search_query.clone();
            query.push(c);
            app.set_search(query);
        }
        _ => {}
    }
}

fn handle_path_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.upload();
        }
        KeyCode::Backspace => {
            app.upload_path.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.upload_path.chars().count(), c) {
                app.upload_path.push(c);
            }
        }
        _ => {}
    }
}

fn handle_share_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('y') | KeyCode::Enter => app.copy_share_link(),
        KeyCode::Esc | KeyCode::Char('q') => app.close_share(),
        _ => {}
    }
}

/// Keys on the login and signup pages.
fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::Quitting,
        KeyCode::Down | KeyCode::Tab => app.form_focus = app.form_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.form_focus = app.form_focus.prev(),
        KeyCode::Enter => match app.form_focus {
            FormFocus::Username => app.form_focus = FormFocus::Password,
            FormFocus::Password | FormFocus::Submit => app.submit_form(),
            FormFocus::Switch => app.switch_auth_page(),
        },
        KeyCode::Backspace => match app.form_focus {
            FormFocus::Username => {
                app.username.pop();
            }
            FormFocus::Password => {
                app.password.pop();
            }
            FormFocus::Submit | FormFocus::Switch => {}
        },
        KeyCode::Char(c) => match app.form_focus {
            FormFocus::Username => {
                if can_add_username_char(app.username.chars().count(), c) {
                    app.username.push(c);
                }
            }
            FormFocus::Password => {
                if can_add_password_char(app.password.chars().count(), c) {
                    app.password.push(c);
                }
            }
            FormFocus::Submit | FormFocus::Switch => {}
        },
        _ => {}
    }
}
