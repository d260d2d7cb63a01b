//! Core library for the Mini Drive client.
//!
//! - `api`: HTTP client for the file-hosting service
//! - `auth`: credential storage, session state and the page guard
//! - `config`: persisted client configuration
//! - `drive`: user-level operations (login, upload, list, ...) and their outcomes
//! - `listing`: file list view model (render rows, search filter)
//! - `share`: share dialog and clipboard handling
//! - `download`: saving downloaded files through a scoped temp file

pub mod api;
pub mod auth;
pub mod config;
pub mod download;
pub mod drive;
pub mod listing;
pub mod models;
pub mod share;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Page, Session};
pub use config::Config;
pub use drive::{Drive, Notice, Outcome, Severity};
pub use listing::FileListView;
pub use models::FileRecord;
