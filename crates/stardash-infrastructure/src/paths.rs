//! Unified path management for stardash configuration files.
//!
//! All stardash configuration and credential data live under one config
//! directory so every storage mechanism agrees on locations.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/stardash/          # Config directory
//! ├── config.toml              # Dashboard configuration
//! └── session.token            # Persisted session credential (0600)
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path resolution for stardash.
pub struct StardashPaths;

impl StardashPaths {
    /// Returns the stardash configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/stardash/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("stardash"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted session token.
    ///
    /// # Security Note
    ///
    /// The token file is created with 600 permissions (user read/write only)
    /// on Unix systems; see `FileTokenStore`.
    pub fn token_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session.token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_config_dir() {
        let dir = StardashPaths::config_dir().unwrap();
        assert!(StardashPaths::config_file().unwrap().starts_with(&dir));
        assert!(StardashPaths::token_file().unwrap().starts_with(&dir));
        assert!(dir.ends_with("stardash"));
    }
}
