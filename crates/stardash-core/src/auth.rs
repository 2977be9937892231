//! Authenticated-session state machine.
//!
//! `AuthSession` owns the session lifecycle and mediates every auth-related
//! side effect: reading and writing the token store, attaching the credential
//! to the backend, and navigation on state transitions. No other component
//! mutates session state.
//!
//! Failure semantics: network failures during startup validation and logout
//! are absorbed and logged, never propagated. The only user-visible failure
//! is a login rejection, surfaced through [`AuthSession::auth_error`].

use crate::backend::AuthBackend;
use crate::navigator::{Navigator, Route};
use crate::token::TokenStore;
use crate::user::User;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Lifecycle states of the session.
///
/// ```text
/// Uninitialized -> Validating -> { Authenticated, Anonymous }
/// Authenticated -> Anonymous        (logout or expiry)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// A persisted token is being validated against the backend.
    Validating,
    /// A validated session is held; the user is non-null exactly here.
    Authenticated(User),
    /// No session. Either no token was persisted or it was invalidated.
    Anonymous,
}

/// Owns login/logout/current-user state and drives the token store,
/// backend credential slot, and navigation.
pub struct AuthSession {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<AuthState>,
    /// Last login failure message, cleared at the start of each attempt.
    error: RwLock<Option<String>>,
    /// Busy indicator for the login flow. Cleared on every exit path.
    loading: AtomicBool,
}

impl AuthSession {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            tokens,
            navigator,
            state: RwLock::new(AuthState::Uninitialized),
            error: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// Restores a persisted session on startup.
    ///
    /// With no stored token this settles on `Anonymous` without touching the
    /// network. With a stored token, the token is attached and validated via
    /// the backend's "who am I" operation; a failure there is expected
    /// (expired or revoked token) and is logged, not surfaced — the token is
    /// discarded and the session becomes `Anonymous`.
    pub async fn initialize(&self) {
        self.set_state(AuthState::Validating);

        let Some(token) = self.tokens.get() else {
            self.set_state(AuthState::Anonymous);
            return;
        };

        self.backend.set_session_token(Some(token));
        match self.backend.current_user().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "restored persisted session");
                self.set_state(AuthState::Authenticated(user));
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored token failed validation, discarding");
                self.tokens.clear();
                self.backend.set_session_token(None);
                self.set_state(AuthState::Anonymous);
            }
        }
    }

    /// Attempts a login with the given credentials.
    ///
    /// On success the returned token is persisted, attached to the backend,
    /// the principal is fetched, and navigation moves to the home view.
    /// Returns `true` on success, `false` on any failure; failures set
    /// [`auth_error`](Self::auth_error) instead of propagating.
    ///
    /// Concurrent logins are not serialized here: the last response to
    /// complete wins. The UI is expected to disable the submit control while
    /// [`is_loading`](Self::is_loading) is set.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.set_error(None);
        self.loading.store(true, Ordering::SeqCst);

        let result = self.login_inner(username, password).await;

        self.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn login_inner(&self, username: &str, password: &str) -> bool {
        let token = match self.backend.login(username, password).await {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!(error = %err, "login rejected");
                self.set_error(Some(err.login_message()));
                return false;
            }
        };

        self.tokens.set(&token);
        self.backend.set_session_token(Some(token));

        match self.backend.current_user().await {
            Ok(user) => {
                self.set_state(AuthState::Authenticated(user));
                self.navigator.navigate(Route::Home);
                true
            }
            Err(err) => {
                // The token stays persisted; the next startup validation
                // clears it if it is genuinely invalid.
                tracing::warn!(error = %err, "post-login user fetch failed");
                self.set_error(Some(err.login_message()));
                false
            }
        }
    }

    /// Tears the session down.
    ///
    /// The server-side logout is best-effort: a failure is logged and
    /// ignored, because local teardown is what matters for client-side
    /// security. Local state is cleared unconditionally and navigation
    /// returns to the login view.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            if let Err(err) = self.backend.logout().await {
                tracing::warn!(error = %err, "server-side logout failed, tearing down locally");
            }
        }

        self.tokens.clear();
        self.backend.set_session_token(None);
        self.set_state(AuthState::Anonymous);
        self.navigator.navigate(Route::Login);
    }

    /// True iff an authenticated user exists and carries `role`.
    /// Never errors; an anonymous session simply lacks every role.
    pub fn has_role(&self, role: &str) -> bool {
        match &*self.state.read().unwrap() {
            AuthState::Authenticated(user) => user.has_role(role),
            _ => false,
        }
    }

    /// The authenticated principal, if any.
    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read().unwrap() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read().unwrap(), AuthState::Authenticated(_))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AuthState {
        self.state.read().unwrap().clone()
    }

    /// Last login failure message, if the most recent attempt failed.
    pub fn auth_error(&self) -> Option<String> {
        self.error.read().unwrap().clone()
    }

    /// Busy indicator for an in-flight login.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: AuthState) {
        *self.state.write().unwrap() = state;
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.write().unwrap() = message;
    }
}
