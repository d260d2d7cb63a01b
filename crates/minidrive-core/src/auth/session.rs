use std::sync::RwLock;

use anyhow::Result;
use tracing::debug;

use super::store::{MemoryTokenStore, TokenStore};

/// Fixed key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

/// The signed-in state of the client.
///
/// Holds the only in-process copy of the bearer token. It is loaded from the
/// backing store once when the session is opened, replaced on login and
/// cleared on logout. Every request reads the token from here at call time.
pub struct Session {
    store: Box<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl Session {
    /// Open a session over `store`, loading any token persisted by a previous run.
    pub fn open(store: Box<dyn TokenStore>) -> Result<Self> {
        let token = store.load(TOKEN_KEY)?.filter(|t| !t.is_empty());
        debug!(has_token = token.is_some(), "Session opened");
        Ok(Self {
            store,
            token: RwLock::new(token),
        })
    }

    /// A session that persists nothing beyond the process.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryTokenStore::default()),
            token: RwLock::new(None),
        }
    }

    /// Get the bearer token, if signed in
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Persist a new token and make it current.
    pub fn store(&self, token: &str) -> Result<()> {
        self.store.save(TOKEN_KEY, token)?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    /// Forget the token. The in-memory copy is dropped even if the backing
    /// store fails to delete its copy.
    pub fn clear(&self) -> Result<()> {
        self.token.write().unwrap_or_else(|e| e.into_inner()).take();
        self.store.remove(TOKEN_KEY)
    }
}
