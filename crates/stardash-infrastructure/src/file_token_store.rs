//! File-backed token store.
//!
//! Persists the session credential to a single file under the stardash
//! config directory so a session survives process restarts, mirroring what
//! browser-local storage does for the hosted dashboard.

use crate::paths::StardashPaths;
use stardash_core::token::TokenStore;
use std::fs;
use std::path::PathBuf;

/// Durable [`TokenStore`] holding the credential in one file.
///
/// The trait requires `get` to be infallible and `set`/`clear` to be
/// fire-and-forget, so filesystem problems are logged at warn level and
/// otherwise degrade to an absent token.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the default location
    /// (`~/.config/stardash/session.token`), creating the config directory
    /// if needed.
    pub fn new() -> Result<Self, stardash_core::StardashError> {
        let path = StardashPaths::token_file()
            .map_err(|e| stardash_core::StardashError::config(e.to_string()))?;
        Ok(Self::at_path(path))
    }

    /// Creates a store at an explicit path. Used by tests and by callers
    /// that manage their own locations.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn write_token(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;

        // Credential file: user read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn set(&self, token: &str) {
        if let Err(err) = self.write_token(token) {
            tracing::warn!(error = %err, path = %self.path.display(), "failed to persist session token");
        }
    }

    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "failed to read session token");
                None
            }
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "failed to remove session token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileTokenStore {
        FileTokenStore::at_path(dir.path().join("session.token"))
    }

    #[test]
    fn test_set_then_get_roundtrips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("T1");
        assert_eq!(store.get(), Some("T1".to_string()));

        store.set("T2");
        assert_eq!(store.get(), Some("T2".to_string()));
    }

    #[test]
    fn test_get_absent_when_never_set() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).get(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("T1");
        store.clear();
        assert_eq!(store.get(), None);

        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set("persisted");

        // A fresh store over the same path sees the credential
        assert_eq!(store_in(&dir).get(), Some("persisted".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("secret");

        let mode = std::fs::metadata(dir.path().join("session.token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
