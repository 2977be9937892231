//! User and API-token administration endpoints.

use crate::dto::{AdminUser, ApiToken, CreatedApiToken, NewApiToken, NewUser};
use crate::http::ApiClient;
use serde_json::json;
use stardash_core::error::Result;

/// `GET|POST /auth/users`, `DELETE /auth/users/{id}`.
#[derive(Clone)]
pub struct UserAdminService {
    client: ApiClient,
}

impl UserAdminService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>> {
        self.client.get("/auth/users").await
    }

    pub async fn create(&self, user: &NewUser) -> Result<AdminUser> {
        self.client.post("/auth/users", user).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/auth/users/{id}")).await
    }
}

/// `GET|POST /auth/tokens`, `DELETE /auth/tokens/{id}`,
/// `PATCH /auth/tokens/{id}/lock`.
#[derive(Clone)]
pub struct ApiTokenService {
    client: ApiClient,
}

impl ApiTokenService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<ApiToken>> {
        self.client.get("/auth/tokens").await
    }

    /// Creates a token. The returned secret is shown once and not
    /// retrievable afterwards.
    pub async fn create(&self, token: &NewApiToken) -> Result<CreatedApiToken> {
        self.client.post("/auth/tokens", token).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/auth/tokens/{id}")).await
    }

    /// Locks or unlocks a token without deleting it.
    pub async fn set_locked(&self, id: &str, locked: bool) -> Result<ApiToken> {
        self.client
            .patch(&format!("/auth/tokens/{id}/lock"), &json!({ "locked": locked }))
            .await
    }
}
