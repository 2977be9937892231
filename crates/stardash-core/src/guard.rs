//! Session-expiry policy.
//!
//! When any response comes back `401 Unauthorized` the local session must be
//! torn down and the user sent back to the login view. This is deliberately
//! a small explicit object rather than generic middleware, so the policy can
//! be exercised in tests without a network or a real navigation stack.

use crate::navigator::{Navigator, Route};
use crate::token::TokenStore;
use std::sync::Arc;

/// Applies the 401 side effect: clear the token store and redirect to the
/// login view unless the current location already is the login view.
///
/// The login-view check guards against redirect loops when a stale token is
/// attached to a request issued from the login page itself.
#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { tokens, navigator }
    }

    /// Runs the expiry side effect. Idempotent: repeated 401s while already
    /// on the login view clear an (already empty) store and navigate zero
    /// additional times.
    pub fn on_unauthorized(&self) {
        self.tokens.clear();
        if self.navigator.current() != Route::Login {
            tracing::debug!("session expired, redirecting to login");
            self.navigator.navigate(Route::Login);
        }
    }
}
