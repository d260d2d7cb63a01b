//! Authentication module for managing the bearer credential.
//!
//! This module provides:
//! - `Credentials`: validated username/password input
//! - `TokenStore`: where the token persists (JSON file, OS keyring, memory)
//! - `Session`: the single in-process owner of the token
//! - `guard`: the protected-page check run before a page renders
//!
//! Tokens are opaque to the client and never expire client side; only the
//! server decides whether a token is still valid.

pub mod credentials;
pub mod guard;
pub mod session;
pub mod store;

pub use credentials::{Credentials, MISSING_CREDENTIALS};
pub use guard::{guard, resolve, Page};
pub use session::{Session, TOKEN_KEY};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
