//! Application state management for the Mini Drive terminal client.
//!
//! This module contains the core `App` struct that manages all application
//! state: the current page, form inputs, the file list view, the share
//! dialog and coordination of background network tasks.

use std::future::Future;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use minidrive_core::auth::{self, Page};
use minidrive_core::drive::{Navigation, Operation, Outcome};
use minidrive_core::listing::{ActionKind, FileListView};
use minidrive_core::share::{Clipboard, CopyOutcome, ShareDialog, SystemClipboard, MANUAL_COPY_NOTICE};
use minidrive_core::{Config, Drive, Notice};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the upload path input.
const MAX_PATH_LENGTH: usize = 1024;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EditingPath,
    ShowingHelp,
    Sharing,
    Quitting,
}

/// Login/signup form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Username,
    Password,
    Submit,
    /// Link to the other auth page (login ↔ signup)
    Switch,
}

impl FormFocus {
    pub fn next(&self) -> Self {
        match self {
            FormFocus::Username => FormFocus::Password,
            FormFocus::Password => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Switch,
            FormFocus::Switch => FormFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormFocus::Username => FormFocus::Switch,
            FormFocus::Password => FormFocus::Username,
            FormFocus::Submit => FormFocus::Password,
            FormFocus::Switch => FormFocus::Submit,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the UI loop.
enum TaskResult {
    /// A user operation finished, tagged with the session it started in
    Finished { epoch: u64, outcome: Outcome },
    /// Result of the startup health check
    Health(bool),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub drive: Drive,

    // UI State
    pub page: Page,
    pub state: AppState,
    pub view: FileListView,
    pub selection: usize,
    pub search_query: String,
    pub upload_path: String,

    // Login/signup form state
    pub username: String,
    pub password: String,
    pub form_focus: FormFocus,

    // Status line
    pub notices: Vec<Notice>,
    pub backend_online: Option<bool>,
    pub in_flight: usize,

    // Share dialog
    pub share: Option<ShareDialog>,
    clipboard: Option<SystemClipboard>,

    pending_navigation: Option<(Page, Instant)>,

    /// Bumped on logout; results of tasks spawned before are dropped.
    session_epoch: u64,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let drive = Drive::from_config(&config)?;
        debug!(authenticated = drive.is_authenticated(), "Drive ready");

        let mut app = Self::with_drive(config, drive);

        // Env vars take precedence over the last successful login
        if let Ok(username) = std::env::var("MINIDRIVE_USERNAME") {
            app.username = username;
        }
        if let Ok(password) = std::env::var("MINIDRIVE_PASSWORD") {
            app.password = password;
        }
        Ok(app)
    }

    /// Create an application around an existing drive.
    pub fn with_drive(config: Config, drive: Drive) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            drive,

            page: Page::Login,
            state: AppState::Normal,
            view: FileListView::new(),
            selection: 0,
            search_query: String::new(),
            upload_path: String::new(),

            username,
            password: String::new(),
            form_focus: FormFocus::Username,

            notices: Vec::new(),
            backend_online: None,
            in_flight: 0,

            share: None,
            clipboard: None,

            pending_navigation: None,

            session_epoch: 0,

            task_rx: rx,
            task_tx: tx,
        }
    }

    /// Show the first page and kick off the startup health check.
    pub fn start(&mut self) {
        let drive = self.drive.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let online = drive.health().await;
            let _ = tx.send(TaskResult::Health(online)).await;
        });

        self.navigate(Page::Files);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch pages. Protected pages go through the session guard first and
    /// reload the file list when shown.
    pub fn navigate(&mut self, page: Page) {
        let target = auth::resolve(page, self.drive.session());
        if target != page {
            info!(requested = ?page, "No credential, redirecting to login");
        }
        self.page = target;
        self.state = AppState::Normal;
        self.pending_navigation = None;

        if target.is_protected() {
            self.refresh();
        } else {
            self.form_focus = if self.username.is_empty() {
                FormFocus::Username
            } else {
                FormFocus::Password
            };
        }
    }

    /// Apply a delayed navigation once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some((page, at)) = self.pending_navigation {
            if now >= at {
                self.navigate(page);
            }
        }
        if let Some(ref mut dialog) = self.share {
            dialog.tick(now);
        }
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let epoch = self.session_epoch;
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = task.await;
            let _ = tx.send(TaskResult::Finished { epoch, outcome }).await;
        });
    }

    /// Drain finished tasks and apply their results.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            match result {
                TaskResult::Finished { epoch, outcome } => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if epoch != self.session_epoch {
                        debug!(operation = ?outcome.operation, "Dropping result from an earlier session");
                        continue;
                    }
                    self.apply(outcome);
                }
                TaskResult::Health(online) => {
                    self.backend_online = Some(online);
                }
            }
        }
    }

    /// Apply everything an operation asked for. Listings always replace the
    /// view wholesale, so the last response to arrive wins. File content is
    /// only shown on a protected page with a credential.
    pub fn apply(&mut self, outcome: Outcome) {
        debug!(operation = ?outcome.operation, success = outcome.is_success(), "Operation finished");

        if outcome.operation == Operation::Login && outcome.is_success() {
            self.password.clear();
            if let Some(username) = outcome.signed_in_as {
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
            }
        }

        let shows_files = self.page.is_protected() && self.drive.is_authenticated();

        if !outcome.notices.is_empty() {
            self.notices = outcome.notices;
        }

        if let Some(Ok(records)) = outcome.listing.filter(|_| shows_files) {
            self.view.replace(&records);
            self.clamp_selection();
        }

        if let Some(link) = outcome.share.filter(|_| shows_files) {
            self.share = Some(ShareDialog::new(link.filename, link.url));
            self.state = AppState::Sharing;
        }

        match outcome.navigation {
            Some(Navigation::Now(page)) => self.navigate(page),
            Some(Navigation::After(page, delay)) => {
                self.pending_navigation = Some((page, Instant::now() + delay));
            }
            None => {}
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login or signup form, depending on the page.
    pub fn submit_form(&mut self) {
        let drive = self.drive.clone();
        let username = self.username.clone();
        let password = self.password.clone();
        match self.page {
            Page::Signup => self.spawn(async move { drive.signup(&username, &password).await }),
            _ => self.spawn(async move { drive.login(&username, &password).await }),
        }
    }

    /// Go to the other auth page.
    pub fn switch_auth_page(&mut self) {
        let other = if self.page == Page::Login {
            Page::Signup
        } else {
            Page::Login
        };
        self.notices.clear();
        self.navigate(other);
    }

    pub fn logout(&mut self) {
        self.session_epoch += 1;
        self.share = None;
        self.view = FileListView::new();
        self.selection = 0;
        self.search_query.clear();
        let outcome = self.drive.logout();
        self.apply(outcome);
    }

    // =========================================================================
    // File operations
    // =========================================================================

    /// Reload the list. Clears any search first.
    pub fn refresh(&mut self) {
        self.search_query.clear();
        self.view.clear_filter();
        let drive = self.drive.clone();
        self.spawn(async move { drive.refresh().await });
    }

    pub fn upload(&mut self) {
        let drive = self.drive.clone();
        let path = self.upload_path.clone();
        self.spawn(async move { drive.upload(&path).await });
    }

    /// Run a row action on the selected visible row.
    pub fn run_action(&mut self, kind: ActionKind) {
        let Some(index) = self.view.nth_visible(self.selection) else {
            return;
        };
        let Some(filename) = self
            .view
            .handle(index, kind)
            .and_then(|handle| self.view.resolve(handle))
            .map(|action| action.filename.clone())
        else {
            return;
        };

        let drive = self.drive.clone();
        match kind {
            ActionKind::Download => self.spawn(async move { drive.download(&filename).await }),
            ActionKind::Delete => self.spawn(async move { drive.delete(&filename).await }),
            ActionKind::Share => self.spawn(async move { drive.share(&filename).await }),
        }
    }

    pub fn copy_share_link(&mut self) {
        let Some(ref mut dialog) = self.share else {
            return;
        };
        if self.clipboard.is_none() {
            self.clipboard = SystemClipboard::connect();
        }
        let clipboard = self.clipboard.as_mut().map(|c| c as &mut dyn Clipboard);
        if dialog.copy(clipboard, Instant::now()) == CopyOutcome::ManualCopy {
            self.notices = vec![Notice::info(MANUAL_COPY_NOTICE)];
        }
    }

    pub fn close_share(&mut self) {
        self.share = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Search & selection
    // =========================================================================

    pub fn set_search(&mut self, query: String) {
        self.search_query = query;
        self.view.filter(&self.search_query);
        self.selection = 0;
    }

    pub fn select_next(&mut self, step: usize) {
        let max = self.view.visible_len().saturating_sub(1);
        self.selection = (self.selection + step).min(max);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    fn clamp_selection(&mut self) {
        let max = self.view.visible_len().saturating_sub(1);
        self.selection = self.selection.min(max);
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

// ============================================================================
// Input Validation Helpers
// ============================================================================

/// Check if a character is valid for form input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if an upload path character should be accepted
pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
