//! Share dialog state and clipboard access.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

/// How long the "Copied!" acknowledgement stays before the label reverts.
pub const COPY_ACK_DURATION: Duration = Duration::from_millis(1500);

/// Notice shown when the link has to be copied by hand.
pub const MANUAL_COPY_NOTICE: &str = "Clipboard not supported. Please copy manually.";

/// Share links stay valid for one day on the server side.
pub const LINK_LIFETIME_NOTE: &str = "Anyone with this link can download the file for 24 hours.";

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connect to the desktop clipboard. `None` when there is none
    /// (headless session, SSH without a display, ...).
    pub fn connect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(e) => {
                warn!(error = %e, "Clipboard unavailable");
                None
            }
        }
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner.set_text(text.to_string())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Clipboard missing or failed; the link text is selected instead.
    ManualCopy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyLabel {
    Copy,
    Copied,
    CopyAgain,
}

/// State of the share dialog for one link.
#[derive(Debug, Clone)]
pub struct ShareDialog {
    pub filename: String,
    pub link: String,
    label: CopyLabel,
    revert_at: Option<Instant>,
    selected: bool,
}

impl ShareDialog {
    pub fn new(filename: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            link: link.into(),
            label: CopyLabel::Copy,
            revert_at: None,
            selected: false,
        }
    }

    /// Copy the link. Falls back to selecting the link text when the
    /// clipboard is missing or refuses the write.
    pub fn copy(&mut self, clipboard: Option<&mut dyn Clipboard>, now: Instant) -> CopyOutcome {
        let copied = match clipboard {
            Some(clipboard) => match clipboard.set_text(&self.link) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Clipboard write failed");
                    false
                }
            },
            None => false,
        };

        if copied {
            self.label = CopyLabel::Copied;
            self.revert_at = Some(now + COPY_ACK_DURATION);
            CopyOutcome::Copied
        } else {
            self.selected = true;
            CopyOutcome::ManualCopy
        }
    }

    /// Revert the acknowledgement once its interval has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(at) = self.revert_at {
            if now >= at {
                self.label = CopyLabel::CopyAgain;
                self.revert_at = None;
            }
        }
    }

    pub fn copy_label(&self) -> &'static str {
        match self.label {
            CopyLabel::Copy => "Copy",
            CopyLabel::Copied => "Copied!",
            CopyLabel::CopyAgain => "Copy Again",
        }
    }

    /// Whether the link text is highlighted for manual copying.
    pub fn is_selected(&self) -> bool {
        self.selected
    }
}
