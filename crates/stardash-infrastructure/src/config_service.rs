//! Configuration service implementation.
//!
//! Loads the dashboard configuration from the configuration file
//! (`~/.config/stardash/config.toml`) with environment-variable overrides
//! for the remote addresses.
//!
//! Priority per value: environment variable > config.toml > built-in default.

use crate::paths::StardashPaths;
use stardash_core::config::DashboardConfig;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Environment override for the REST base address.
pub const ENV_API_URL: &str = "STARDASH_API_URL";
/// Environment overrides for the document-store binding.
pub const ENV_DOC_ENDPOINT: &str = "STARDASH_DOC_ENDPOINT";
pub const ENV_DOC_PROJECT_ID: &str = "STARDASH_DOC_PROJECT_ID";
pub const ENV_DOC_DATABASE_ID: &str = "STARDASH_DOC_DATABASE_ID";

/// Configuration service that loads and caches the dashboard configuration.
///
/// A missing or unreadable config file is not an error: the built-in
/// defaults apply, which is the common case for a fresh checkout pointed at
/// a local StarAPI instance.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<DashboardConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the default config location.
    pub fn new() -> Self {
        Self {
            path: StardashPaths::config_file().ok(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading from an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> DashboardConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = match self.path.as_deref() {
            Some(path) => Self::load_file(path),
            None => DashboardConfig::default(),
        };
        Self::apply_env_overrides(&mut loaded);

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    fn load_file(path: &Path) -> DashboardConfig {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "invalid config file, using defaults");
                    DashboardConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DashboardConfig::default(),
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "unreadable config file, using defaults");
                DashboardConfig::default()
            }
        }
    }

    fn apply_env_overrides(config: &mut DashboardConfig) {
        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.is_empty() {
                config.api.base_url = url;
            }
        }
        if let Ok(endpoint) = env::var(ENV_DOC_ENDPOINT) {
            if !endpoint.is_empty() {
                config.document_store.endpoint = endpoint;
            }
        }
        if let Ok(project) = env::var(ENV_DOC_PROJECT_ID) {
            if !project.is_empty() {
                config.document_store.project_id = project;
            }
        }
        if let Ok(database) = env::var(ENV_DOC_DATABASE_ID) {
            if !database.is_empty() {
                config.document_store.database_id = database;
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardash_core::config::AuthBackendKind;
    use std::io::Write;

    #[test]
    fn test_loads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            auth_backend = "document-store"

            [api]
            base_url = "https://star.example.com/api"

            [dashboard]
            poll_interval_ms = 5000
            "#
        )
        .unwrap();

        let service = ConfigService::at_path(file.path());
        let config = service.get_config();

        assert_eq!(config.auth_backend, AuthBackendKind::DocumentStore);
        assert_eq!(config.api.base_url, "https://star.example.com/api");
        assert_eq!(config.dashboard.poll_interval_ms, 5000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let service = ConfigService::at_path(dir.path().join("nope.toml"));
        let config = service.get_config();

        assert_eq!(config.api.base_url, stardash_core::config::DEFAULT_API_BASE_URL);
        assert_eq!(config.dashboard.poll_interval_ms, 30_000);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [").unwrap();

        let config = ConfigService::at_path(file.path()).get_config();
        assert_eq!(config.auth_backend, AuthBackendKind::Rest);
    }

    #[test]
    fn test_cache_returns_same_config_until_invalidated() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"https://one.example\"\n").unwrap();

        let service = ConfigService::at_path(&path);
        assert_eq!(service.get_config().api.base_url, "https://one.example");

        std::fs::write(&path, "[api]\nbase_url = \"https://two.example\"\n").unwrap();
        // Cached until invalidated
        assert_eq!(service.get_config().api.base_url, "https://one.example");

        service.invalidate_cache();
        assert_eq!(service.get_config().api.base_url, "https://two.example");
    }
}
