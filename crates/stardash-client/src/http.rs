//! StarAPI REST client.
//!
//! Single point of outbound HTTP requests carrying authentication state.
//! Every request merges the default JSON content type with the session
//! token (when present) as a bearer `Authorization` header. A `401` on any
//! response triggers the session-expiry side effect before the error is
//! returned to the caller unchanged in meaning, so callers can still show a
//! local error state.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use stardash_core::SessionGuard;
use stardash_core::error::{Result, StardashError};
use std::sync::{Arc, RwLock};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the StarAPI REST surface.
///
/// Cheap to clone; clones share the bearer slot, so attaching a token on
/// one handle is visible to every service built over the same client.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    /// Base address without a trailing slash, e.g. `http://localhost:3000/api`.
    base: String,
    /// Session token attached as `Authorization: Bearer <token>` when present.
    bearer: Arc<RwLock<Option<String>>>,
    guard: SessionGuard,
}

impl ApiClient {
    /// Creates a client against `base_url`.
    ///
    /// The address is validated once here; request paths are appended to it
    /// verbatim (the base may carry a path prefix such as `/api`).
    pub fn new(base_url: impl Into<String>, guard: SessionGuard) -> Result<Self> {
        let base = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base)
            .map_err(|e| StardashError::config(format!("invalid API base URL '{base}': {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base,
            bearer: Arc::new(RwLock::new(None)),
            guard,
        })
    }

    /// Attaches (or detaches) the session token used by subsequent requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.bearer.write().unwrap() = token;
    }

    /// Issues a GET request and decodes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.prepare(Method::GET, path)?).await?;
        Self::decode(response).await
    }

    /// Issues a GET request with serialized query parameters.
    pub async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.prepare(Method::GET, path)?.query(query);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Issues a POST request with a JSON body and decodes the response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.prepare(Method::POST, path)?.json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Issues a bodyless POST request, discarding any response body.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        self.send(self.prepare(Method::POST, path)?).await?;
        Ok(())
    }

    /// Issues a PUT request with a JSON body and decodes the response.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.prepare(Method::PUT, path)?.json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Issues a PATCH request with a JSON body and decodes the response.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.prepare(Method::PATCH, path)?.json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Issues a DELETE request, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.prepare(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// Builds a request with the default header set merged with the bearer
    /// credential. Kept separate from sending so header attachment is
    /// verifiable without a network.
    fn prepare(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self
            .client
            .request(method, url)
            .timeout(REQUEST_TIMEOUT)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.bearer.read().unwrap().as_deref() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        Ok(builder)
    }

    fn url(&self, path: &str) -> Result<Url> {
        // Paths are appended rather than joined so a base prefix like
        // `/api` is preserved.
        let full = format!("{}{}", self.base, path);
        Url::parse(&full).map_err(|e| StardashError::config(format!("invalid URL '{full}': {e}")))
    }

    /// Sends the request and maps non-success statuses to errors.
    ///
    /// On `401 Unauthorized` the session guard runs first (clear token
    /// store, redirect to login unless already there); the error is then
    /// still returned so the caller sees the failure.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.guard.on_unauthorized();
            let message = Self::error_message(response).await;
            return Err(StardashError::unauthorized(message));
        }

        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::debug!(status = status.as_u16(), %message, "request failed");
            return Err(StardashError::api(status.as_u16(), message));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| StardashError::Serialization {
            format: "JSON".to_string(),
            message: e.to_string(),
        })
    }

    /// Extracts the server-supplied error message from a failed response.
    /// StarAPI uses `{"error": "..."}`; anything else falls back to the raw
    /// body or the bare status.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            for key in ["error", "message"] {
                if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                    return message.to_string();
                }
            }
        }

        if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardash_core::navigator::{MemoryNavigator, Navigator, Route};
    use stardash_core::token::{MemoryTokenStore, TokenStore};

    fn client_with_store() -> (ApiClient, Arc<MemoryTokenStore>, Arc<MemoryNavigator>) {
        let tokens = Arc::new(MemoryTokenStore::new());
        let nav = Arc::new(MemoryNavigator::new(Route::Dashboard));
        let guard = SessionGuard::new(tokens.clone(), nav.clone());
        let client = ApiClient::new("http://localhost:3000/api", guard).unwrap();
        (client, tokens, nav)
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let nav = Arc::new(MemoryNavigator::default());
        let guard = SessionGuard::new(tokens, nav);
        assert!(ApiClient::new("not a url", guard).is_err());
    }

    #[test]
    fn test_requests_carry_bearer_when_token_present() {
        let (client, _tokens, _nav) = client_with_store();
        client.set_token(Some("T1".to_string()));

        let request = client.prepare(Method::GET, "/auth/me").unwrap().build().unwrap();

        assert_eq!(header(&request, "authorization"), Some("Bearer T1"));
        assert_eq!(header(&request, "content-type"), Some("application/json"));
    }

    #[test]
    fn test_requests_omit_authorization_without_token() {
        let (client, _tokens, _nav) = client_with_store();

        let request = client.prepare(Method::GET, "/system/health").unwrap().build().unwrap();

        assert_eq!(header(&request, "authorization"), None);
    }

    #[test]
    fn test_detached_token_no_longer_sent() {
        let (client, _tokens, _nav) = client_with_store();
        client.set_token(Some("T1".to_string()));
        client.set_token(None);

        let request = client.prepare(Method::GET, "/system/health").unwrap().build().unwrap();

        assert_eq!(header(&request, "authorization"), None);
    }

    #[test]
    fn test_clones_share_the_bearer_slot() {
        let (client, _tokens, _nav) = client_with_store();
        let clone = client.clone();
        client.set_token(Some("T1".to_string()));

        let request = clone.prepare(Method::GET, "/auth/me").unwrap().build().unwrap();

        assert_eq!(header(&request, "authorization"), Some("Bearer T1"));
    }

    #[test]
    fn test_base_prefix_is_preserved() {
        let (client, _tokens, _nav) = client_with_store();
        let request = client
            .prepare(Method::GET, "/system/metrics/history")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:3000/api/system/metrics/history"
        );
    }

    #[test]
    fn test_query_parameters_are_appended() {
        let (client, _tokens, _nav) = client_with_store();
        let request = client
            .prepare(Method::GET, "/system/metrics/history")
            .unwrap()
            .query(&[("timeframe", "24h")])
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("timeframe=24h"));
    }

    // The 401 side effect itself is covered against the guard directly in
    // stardash-core; here we only pin that the guard wired into the client
    // is the shared one.
    #[test]
    fn test_guard_shares_token_store() {
        let (client, tokens, nav) = client_with_store();
        tokens.set("stale");

        client.guard.on_unauthorized();

        assert_eq!(tokens.get(), None);
        assert_eq!(nav.current(), Route::Login);
    }
}
