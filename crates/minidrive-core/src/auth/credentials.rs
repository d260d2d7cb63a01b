use serde::Serialize;

use crate::api::ApiError;

/// Message shown when either login field is blank.
pub const MISSING_CREDENTIALS: &str = "Please enter both username and password.";

/// Validated username/password pair, sent as the JSON body of `/login` and `/signup`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Trim both fields and reject the pair if either ends up empty.
    pub fn new(username: &str, password: &str) -> Result<Self, ApiError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(MISSING_CREDENTIALS.to_string()));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
