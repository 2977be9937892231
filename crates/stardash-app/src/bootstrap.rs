//! Application wiring.
//!
//! Builds both remote bindings from the configuration, selects which one
//! backs authentication, and assembles the session manager plus the typed
//! endpoint services used by the pages.

use stardash_client::{
    ApiClient, ApiTokenService, DocumentStoreBackend, LogsService, RestAuthBackend,
    SettingsService, SystemService, UserAdminService,
};
use stardash_core::config::{AuthBackendKind, DashboardConfig};
use stardash_core::error::Result;
use stardash_core::{AuthBackend, AuthSession, Navigator, SessionGuard, TokenStore};
use std::sync::Arc;

/// Everything a page needs, wired once at startup.
///
/// Both bindings are always constructed (different parts of the UI read
/// from different backends); configuration only decides which one the
/// session layer authenticates against.
pub struct AppContext {
    pub config: DashboardConfig,
    pub session: Arc<AuthSession>,
    pub api: ApiClient,
    pub documents: DocumentStoreBackend,
    pub system: SystemService,
    pub logs: LogsService,
    pub settings: SettingsService,
    pub users: UserAdminService,
    pub api_tokens: ApiTokenService,
}

/// Assembles the application context from configuration and the injected
/// token store and navigator.
pub fn build(
    config: DashboardConfig,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
) -> Result<AppContext> {
    let guard = SessionGuard::new(tokens.clone(), navigator.clone());

    let api = ApiClient::new(config.api.base_url.clone(), guard.clone())?;
    let documents = DocumentStoreBackend::new(config.document_store.clone(), guard)?;

    let backend: Arc<dyn AuthBackend> = match config.auth_backend {
        AuthBackendKind::Rest => Arc::new(RestAuthBackend::new(api.clone())),
        AuthBackendKind::DocumentStore => Arc::new(documents.clone()),
    };
    let session = Arc::new(AuthSession::new(backend, tokens, navigator));

    Ok(AppContext {
        session,
        system: SystemService::new(api.clone()),
        logs: LogsService::new(api.clone()),
        settings: SettingsService::new(api.clone()),
        users: UserAdminService::new(api.clone()),
        api_tokens: ApiTokenService::new(api.clone()),
        api,
        documents,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardash_core::{MemoryNavigator, MemoryTokenStore, Route};

    fn wired(kind: AuthBackendKind) -> AppContext {
        let config = DashboardConfig {
            auth_backend: kind,
            ..Default::default()
        };
        build(
            config,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemoryNavigator::new(Route::Login)),
        )
        .unwrap()
    }

    #[test]
    fn test_builds_with_rest_backend() {
        let ctx = wired(AuthBackendKind::Rest);
        assert!(!ctx.session.is_authenticated());
    }

    #[test]
    fn test_builds_with_document_store_backend() {
        let ctx = wired(AuthBackendKind::DocumentStore);
        assert!(!ctx.session.is_authenticated());
    }
}
