//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, auth pages and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Page content for the protected pages (files, upload)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
