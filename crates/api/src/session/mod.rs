//! Client-side session persistence
//!
//! The access and refresh tokens are only ever written or removed as a pair.
//! A store holding one without the other is treated as logged out.

mod file;
mod memory;
mod signal;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use signal::{SessionSignal, SessionState};

use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session object returned by the backend on signup, login and refresh
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never end up in logs.
impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Errors raised by a [`SessionStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key-value storage for the session tokens and the theme preference
///
/// Each operation is atomic on its own; callers never hold a lock across
/// operations.
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Overwrite both tokens
    fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError>;

    /// Remove both tokens
    fn clear_tokens(&self) -> Result<(), StoreError>;

    fn theme(&self) -> Option<Theme>;

    fn store_theme(&self, theme: Theme) -> Result<(), StoreError>;

    /// Both tokens are present
    fn has_session(&self) -> bool {
        self.access_token().is_some() && self.refresh_token().is_some()
    }
}

/// On-disk and in-memory layout shared by the bundled stores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

impl StoredState {
    fn set_tokens(&mut self, tokens: &SessionTokens) {
        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
    }

    fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }
}
