//! In-memory session store

use super::{SessionStore, SessionTokens, StoreError, StoredState};
use crate::theme::Theme;
use std::sync::{Arc, PoisonError, RwLock};

/// Session store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<RwLock<StoredState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a session
    pub fn with_tokens(tokens: &SessionTokens) -> Self {
        let mut state = StoredState::default();
        state.set_tokens(tokens);
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn read(&self) -> StoredState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut StoredState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *state);
    }
}

impl SessionStore for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
        self.update(|state| state.set_tokens(tokens));
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), StoreError> {
        self.update(StoredState::clear_tokens);
        Ok(())
    }

    fn theme(&self) -> Option<Theme> {
        self.read().theme
    }

    fn store_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.update(|state| state.theme = Some(theme));
        Ok(())
    }
}
