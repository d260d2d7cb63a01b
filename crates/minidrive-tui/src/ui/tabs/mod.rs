//! Page content for the signed-in pages.

pub mod files;
pub mod upload;
