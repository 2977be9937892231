//! Configuration types.
//!
//! These are the pure config structures; loading them from `config.toml`
//! and the environment is the job of `stardash-infrastructure`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_DOC_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_HISTORY_TIMEFRAME: &str = "24h";

/// Which binding the session layer authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthBackendKind {
    #[default]
    Rest,
    DocumentStore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Identifiers for the document-store binding. All optional with defaults;
/// empty ids simply mean the document-store paths are unusable, which is
/// fine when `auth_backend = "rest"` and no page uses document queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    #[serde(default = "default_doc_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default)]
    pub metrics_collection_id: String,
    #[serde(default)]
    pub logs_collection_id: String,
    #[serde(default = "default_audit_collection")]
    pub audit_collection_id: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_doc_endpoint(),
            project_id: String::new(),
            database_id: String::new(),
            metrics_collection_id: String::new(),
            logs_collection_id: String::new(),
            audit_collection_id: default_audit_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed refresh period for the dashboard poller, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Timeframe passed to the metrics-history endpoint, e.g. "24h".
    #[serde(default = "default_history_timeframe")]
    pub history_timeframe: String,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            history_timeframe: default_history_timeframe(),
        }
    }
}

/// Root configuration for the dashboard client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub auth_backend: AuthBackendKind,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub document_store: DocumentStoreConfig,
    #[serde(default)]
    pub dashboard: PollingConfig,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_doc_endpoint() -> String {
    DEFAULT_DOC_ENDPOINT.to_string()
}

fn default_audit_collection() -> String {
    "audit_logs".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_history_timeframe() -> String {
    DEFAULT_HISTORY_TIMEFRAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.auth_backend, AuthBackendKind::Rest);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.dashboard.poll_interval_ms, 30_000);
        assert_eq!(config.document_store.audit_collection_id, "audit_logs");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            auth_backend = "document-store"

            [api]
            base_url = "https://star.example.com/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth_backend, AuthBackendKind::DocumentStore);
        assert_eq!(config.api.base_url, "https://star.example.com/api");
        // Untouched sections keep their defaults
        assert_eq!(config.dashboard.history_timeframe, "24h");
        assert_eq!(config.document_store.endpoint, DEFAULT_DOC_ENDPOINT);
    }
}
