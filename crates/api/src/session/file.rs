//! Session store persisted as a JSON file
//!
//! The file is re-read on every access so that separate processes sharing the
//! same state directory see each other's logins and logouts. Writes replace
//! the file through a uniquely named temporary sibling and a rename.

use super::{SessionStore, SessionTokens, StoreError, StoredState};
use crate::theme::Theme;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Session store backed by a JSON file that survives restarts
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoredState {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(
                    "Ignoring unreadable session file {}: {e}",
                    self.path.display()
                );
                StoredState::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => StoredState::default(),
            Err(e) => {
                warn!("Failed to read session file {}: {e}", self.path.display());
                StoredState::default()
            }
        }
    }

    fn update(&self, f: impl FnOnce(&mut StoredState)) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.load();
        f(&mut state);
        self.persist(&state)
    }

    fn persist(&self, state: &StoredState) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        // Unique per writer so concurrent processes never share a temp file
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(state)?)?;

        // Owner read/write only; the file holds bearer credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file().set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("Persisted session state to {}", self.path.display());
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }

    fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
        self.update(|state| state.set_tokens(tokens))
    }

    fn clear_tokens(&self) -> Result<(), StoreError> {
        self.update(StoredState::clear_tokens)
    }

    fn theme(&self) -> Option<Theme> {
        self.load().theme
    }

    fn store_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.update(|state| state.theme = Some(theme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.access_token(), None);
        assert_eq!(store.theme(), None);
        assert!(!store.has_session());
    }

    #[test]
    fn session_survives_reopening() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::new(&path);
        store
            .store_tokens(&SessionTokens::new("abc123", "r1"))
            .unwrap();
        store.store_theme(Theme::Dark).unwrap();
        drop(store);

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.access_token().as_deref(), Some("abc123"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("r1"));
        assert_eq!(reopened.theme(), Some(Theme::Dark));
    }

    #[test]
    fn clear_removes_both_tokens_only() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.store_tokens(&SessionTokens::new("a", "r")).unwrap();
        store.store_theme(Theme::Light).unwrap();

        store.clear_tokens().unwrap();

        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert_eq!(store.theme(), Some(Theme::Light));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("access_token"));
    }

    #[test]
    fn corrupt_file_is_ignored_and_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert_eq!(store.access_token(), None);

        store.store_tokens(&SessionTokens::new("a", "r")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a"));
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.store_tokens(&SessionTokens::new("a", "r")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn concurrent_writers_do_not_clobber_each_other() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    // Separate stores share no lock, like separate processes
                    let store = FileSessionStore::new(path);
                    (0..20)
                        .map(|n| {
                            store.store_tokens(&SessionTokens::new(format!("a{i}-{n}"), "r"))
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let store = FileSessionStore::new(&path);
        assert!(store.has_session());
        assert_eq!(store.refresh_token().as_deref(), Some("r"));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("session.json")]);
    }
}
