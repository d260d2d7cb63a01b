use super::Session;

/// Screens of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Signup,
    Files,
    Upload,
}

impl Page {
    /// Pages that require a stored credential.
    pub fn is_protected(&self) -> bool {
        matches!(self, Page::Files | Page::Upload)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Signup => "Sign up",
            Page::Files => "Files",
            Page::Upload => "Upload",
        }
    }
}

/// Where to redirect before `page` renders, if anywhere.
pub fn guard(page: Page, session: &Session) -> Option<Page> {
    if page.is_protected() && !session.is_authenticated() {
        Some(Page::Login)
    } else {
        None
    }
}

/// The page that actually gets shown when `page` is requested.
pub fn resolve(page: Page, session: &Session) -> Page {
    guard(page, session).unwrap_or(page)
}
