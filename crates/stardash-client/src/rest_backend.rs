//! REST implementation of the auth capability.

use crate::dto::{LoginRequest, LoginResponse};
use crate::http::ApiClient;
use async_trait::async_trait;
use stardash_core::backend::AuthBackend;
use stardash_core::error::Result;
use stardash_core::user::User;

/// [`AuthBackend`] over the StarAPI REST surface.
///
/// Login exchanges credentials for a bearer token; the attached token rides
/// on every subsequent request through the shared [`ApiClient`].
#[derive(Clone)]
pub struct RestAuthBackend {
    client: ApiClient,
}

impl RestAuthBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthBackend for RestAuthBackend {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response: LoginResponse = self
            .client
            .post("/auth/login", &LoginRequest { username, password })
            .await?;
        Ok(response.token)
    }

    async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }

    async fn logout(&self) -> Result<()> {
        self.client.post_empty("/auth/logout").await
    }

    fn set_session_token(&self, token: Option<String>) {
        self.client.set_token(token);
    }
}
