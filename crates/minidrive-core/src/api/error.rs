use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential store error: {0}")]
    Store(String),
}

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or bad input, or a local resource failed. No request was answered.
    Local,
    /// The server answered but not with what the operation needed.
    Application,
    /// No response was obtained.
    Transport,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) | ApiError::Io(_) | ApiError::Store(_) => ErrorKind::Local,
            ApiError::Rejected { .. } | ApiError::InvalidResponse(_) => ErrorKind::Application,
            ApiError::Network(_) => ErrorKind::Transport,
        }
    }

    /// Text shown to the user. Server-provided messages are passed through
    /// verbatim; `fallback` is used when the server gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Rejected {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            ApiError::Rejected { .. } | ApiError::InvalidResponse(_) => fallback.to_string(),
            ApiError::Network(e) => format!("Network error: {}", e),
            ApiError::Io(e) => format!("{} ({})", fallback, e),
            ApiError::Store(msg) => msg.clone(),
        }
    }

    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        ApiError::Rejected { status, message }
    }
}
