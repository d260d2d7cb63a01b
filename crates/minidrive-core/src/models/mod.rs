//! Data models for Mini Drive entities.

pub mod file;

pub use file::{FileRecord, ShareLink};
pub(crate) use file::Reply;
