//! REST API client module for the Mini Drive service.
//!
//! This module provides the `ApiClient` for authenticating, uploading,
//! listing, downloading, deleting and sharing files.
//!
//! File endpoints use bearer token authentication; the token is obtained
//! from the `/login` endpoint and never inspected by the client.

pub mod client;
pub mod error;

pub use client::{ApiClient, Payload};
pub use error::{ApiError, ErrorKind};
