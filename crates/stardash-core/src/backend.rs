//! Backend capability trait.
//!
//! The dashboard talks to either the StarAPI REST surface or a generic
//! document-store service depending on configuration. The session layer
//! only needs three operations plus a way to attach the current credential,
//! so both bindings implement this one trait and are interchangeable.

use crate::error::Result;
use crate::user::User;
use async_trait::async_trait;

/// Authentication operations every backend binding must provide.
///
/// Implementations live in `stardash-client`:
/// - `RestAuthBackend` (bearer token against the StarAPI REST surface)
/// - `DocumentStoreBackend` (email session against a document-store API)
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges credentials for an opaque session token.
    ///
    /// Credential rejection surfaces as `StardashError::Auth` or
    /// `StardashError::Unauthorized` carrying the server's message.
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Fetches the principal the current session token belongs to.
    async fn current_user(&self) -> Result<User>;

    /// Invalidates the session server-side. Callers treat failures as
    /// best-effort; local teardown happens regardless.
    async fn logout(&self) -> Result<()>;

    /// Attaches (or detaches, with `None`) the session token used by every
    /// subsequent request from this binding.
    fn set_session_token(&self, token: Option<String>);
}
