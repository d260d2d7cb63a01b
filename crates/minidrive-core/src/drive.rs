//! User-level operations.
//!
//! `Drive` runs one user action end to end (validation, request, session
//! update, follow-up refresh) and reports what the UI should show as an
//! `Outcome`. It is cheap to clone so each action can run on its own task.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Credentials, Page, Session};
use crate::config::Config;
use crate::download;
use crate::models::{FileRecord, ShareLink};

/// Pause between a successful login and moving on to the upload page.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(800);

/// Shown whenever a listing fails, whatever the cause.
pub const LIST_FAILED: &str = "Failed to load files. Please check your login or token.";

pub const NO_FILE_SELECTED: &str = "Please select a file to upload.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One user-facing status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
    Upload,
    List,
    Download,
    Delete,
    Share,
    Logout,
}

impl Operation {
    /// Message used when the server rejects the operation without saying why.
    pub fn fallback(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Signup => "Signup failed",
            Operation::Upload => "Upload failed",
            Operation::List => LIST_FAILED,
            Operation::Download => "Download failed.",
            Operation::Delete => "Delete failed.",
            Operation::Share => "Failed to generate share link.",
            Operation::Logout => "Logout failed",
        }
    }
}

/// Requested page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Now(Page),
    After(Page, Duration),
}

/// Everything a finished operation asks the UI to do.
#[derive(Debug)]
pub struct Outcome {
    pub operation: Operation,
    pub notices: Vec<Notice>,
    pub navigation: Option<Navigation>,
    /// Present exactly when the operation ran a listing.
    pub listing: Option<Result<Vec<FileRecord>, ApiError>>,
    pub share: Option<ShareLink>,
    pub saved_to: Option<PathBuf>,
    /// Username a successful login was submitted with.
    pub signed_in_as: Option<String>,
}

impl Outcome {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            notices: Vec::new(),
            navigation: None,
            listing: None,
            share: None,
            saved_to: None,
            signed_in_as: None,
        }
    }

    fn failed(operation: Operation, error: &ApiError) -> Self {
        let mut outcome = Self::new(operation);
        outcome.notices.push(Notice::error(error.user_message(operation.fallback())));
        outcome
    }

    fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn is_success(&self) -> bool {
        !self.notices.iter().any(|n| n.severity == Severity::Error)
    }
}

#[derive(Clone)]
pub struct Drive {
    api: ApiClient,
    session: Arc<Session>,
    download_dir: PathBuf,
}

impl Drive {
    pub fn new(api: ApiClient, session: Arc<Session>, download_dir: PathBuf) -> Self {
        Self {
            api,
            session,
            download_dir,
        }
    }

    /// Build from configuration: client for the configured address, session
    /// over the configured token store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api_base, config.request_timeout())?;
        let session = Arc::new(config.open_session()?);
        Ok(Self::new(api, session, config.download_dir()))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub async fn health(&self) -> bool {
        match self.api.health().await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                false
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Outcome {
        let credentials = match Credentials::new(username, password) {
            Ok(c) => c,
            Err(e) => return Outcome::failed(Operation::Login, &e),
        };

        let token = match self.api.login(&credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(username = credentials.username(), error = %e, "Login failed");
                return Outcome::failed(Operation::Login, &e);
            }
        };

        if let Err(e) = self.session.store(&token) {
            warn!(error = %e, "Failed to persist token");
            let err = ApiError::Store(format!("Could not save login: {:#}", e));
            return Outcome::failed(Operation::Login, &err);
        }

        info!(username = credentials.username(), "Login successful");
        let mut outcome = Outcome::new(Operation::Login)
            .notice(Notice::success("Login successful — redirecting..."));
        outcome.navigation = Some(Navigation::After(Page::Upload, LOGIN_REDIRECT_DELAY));
        outcome.signed_in_as = Some(credentials.username().to_string());
        outcome
    }

    pub async fn signup(&self, username: &str, password: &str) -> Outcome {
        let credentials = match Credentials::new(username, password) {
            Ok(c) => c,
            Err(e) => return Outcome::failed(Operation::Signup, &e),
        };

        match self.api.signup(&credentials).await {
            Ok(()) => {
                info!(username = credentials.username(), "Signup successful");
                Outcome::new(Operation::Signup)
                    .notice(Notice::success("Signup successful — you can now login."))
            }
            Err(e) => {
                warn!(username = credentials.username(), error = %e, "Signup failed");
                Outcome::failed(Operation::Signup, &e)
            }
        }
    }

    /// Upload the file at `path`, then refresh the listing.
    pub async fn upload(&self, path: &str) -> Outcome {
        let path = PathBuf::from(path.trim());
        let is_file = !path.as_os_str().is_empty()
            && tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
        if !is_file {
            let err = ApiError::Validation(NO_FILE_SELECTED.to_string());
            return Outcome::failed(Operation::Upload, &err);
        }

        let token = self.session.token();
        match self.api.upload(token.as_deref(), &path).await {
            Ok(stored_as) => {
                info!(file = %stored_as, "Upload complete");
                let outcome = Outcome::new(Operation::Upload)
                    .notice(Notice::success("File uploaded successfully."));
                self.with_refresh(outcome).await
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Upload failed");
                Outcome::failed(Operation::Upload, &e)
            }
        }
    }

    /// Fetch the current file set.
    pub async fn list(&self) -> Result<Vec<FileRecord>, ApiError> {
        let token = self.session.token();
        self.api.list_files(token.as_deref()).await
    }

    pub async fn refresh(&self) -> Outcome {
        self.with_refresh(Outcome::new(Operation::List)).await
    }

    async fn with_refresh(&self, mut outcome: Outcome) -> Outcome {
        let listing = self.list().await;
        if let Err(ref e) = listing {
            warn!(error = %e, "Error loading files");
            outcome.notices.push(Notice::error(LIST_FAILED));
        }
        outcome.listing = Some(listing);
        outcome
    }

    /// Download `filename` into the download directory.
    pub async fn download(&self, filename: &str) -> Outcome {
        let token = self.session.token();
        let result = match self.api.download(token.as_deref(), filename).await {
            Ok(payload) => download::save(payload, &self.download_dir, filename).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(path) => {
                info!(file = filename, path = %path.display(), "Download complete");
                let mut outcome = Outcome::new(Operation::Download)
                    .notice(Notice::success(format!("Saved to {}", path.display())));
                outcome.saved_to = Some(path);
                outcome
            }
            Err(e) => {
                warn!(file = filename, error = %e, "Download failed");
                Outcome::failed(Operation::Download, &e)
            }
        }
    }

    /// Delete `filename`. Only a successful delete refreshes the listing.
    pub async fn delete(&self, filename: &str) -> Outcome {
        let token = self.session.token();
        match self.api.delete(token.as_deref(), filename).await {
            Ok(()) => {
                info!(file = filename, "File deleted");
                let outcome = Outcome::new(Operation::Delete).notice(Notice::success("File deleted."));
                self.with_refresh(outcome).await
            }
            Err(e) => {
                warn!(file = filename, error = %e, "Delete failed");
                Outcome::failed(Operation::Delete, &e)
            }
        }
    }

    pub async fn share(&self, filename: &str) -> Outcome {
        let token = self.session.token();
        match self.api.share(token.as_deref(), filename).await {
            Ok(url) => {
                info!(file = filename, "Share link created");
                let mut outcome = Outcome::new(Operation::Share);
                outcome.share = Some(ShareLink {
                    filename: filename.to_string(),
                    url,
                });
                outcome
            }
            Err(e) => {
                warn!(file = filename, error = %e, "Share failed");
                Outcome::failed(Operation::Share, &e)
            }
        }
    }

    /// Forget the credential and go to the login page. Purely local.
    pub fn logout(&self) -> Outcome {
        let mut outcome = Outcome::new(Operation::Logout);
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove stored token");
            outcome
                .notices
                .push(Notice::error(format!("Could not remove saved login: {:#}", e)));
        } else {
            info!("Logged out");
        }
        outcome.navigation = Some(Navigation::Now(Page::Login));
        outcome
    }
}
