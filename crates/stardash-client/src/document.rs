//! Document-store binding.
//!
//! An alternate backend over a generic document-store HTTP API (Appwrite v1
//! wire format): email-session authentication plus field-filtered document
//! listings. Parts of the dashboard read metrics and logs from collections
//! here instead of the StarAPI REST surface; the session layer only sees the
//! [`AuthBackend`] capability, so the two bindings are interchangeable.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use stardash_core::SessionGuard;
use stardash_core::backend::AuthBackend;
use stardash_core::config::DocumentStoreConfig;
use stardash_core::error::{Result, StardashError};
use stardash_core::user::User;
use std::sync::{Arc, RwLock};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const HISTORY_LIMIT: u32 = 500;

/// A field-based query filter, rendered in the document store's string
/// syntax, e.g. `equal("severity", ["error"])` or `limit(50)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, serde_json::Value),
    GreaterThan(String, serde_json::Value),
    GreaterThanEqual(String, serde_json::Value),
    LessThan(String, serde_json::Value),
    LessThanEqual(String, serde_json::Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
}

impl Query {
    pub fn equal(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self::Equal(field.to_string(), value.into())
    }

    pub fn greater_than(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self::GreaterThan(field.to_string(), value.into())
    }

    pub fn greater_than_equal(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self::GreaterThanEqual(field.to_string(), value.into())
    }

    pub fn less_than(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self::LessThan(field.to_string(), value.into())
    }

    pub fn less_than_equal(field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self::LessThanEqual(field.to_string(), value.into())
    }

    pub fn order_asc(field: &str) -> Self {
        Self::OrderAsc(field.to_string())
    }

    pub fn order_desc(field: &str) -> Self {
        Self::OrderDesc(field.to_string())
    }

    pub fn limit(limit: u32) -> Self {
        Self::Limit(limit)
    }

    /// Renders the wire form sent as a `queries[]` parameter.
    pub fn render(&self) -> String {
        fn comparison(op: &str, field: &str, value: &serde_json::Value) -> String {
            // Values ride inside a JSON array, so strings come out quoted.
            format!("{op}(\"{field}\", [{}])", serde_json::to_string(value).unwrap_or_default())
        }

        match self {
            Self::Equal(field, value) => comparison("equal", field, value),
            Self::GreaterThan(field, value) => comparison("greaterThan", field, value),
            Self::GreaterThanEqual(field, value) => comparison("greaterThanEqual", field, value),
            Self::LessThan(field, value) => comparison("lessThan", field, value),
            Self::LessThanEqual(field, value) => comparison("lessThanEqual", field, value),
            Self::OrderAsc(field) => format!("orderAsc(\"{field}\")"),
            Self::OrderDesc(field) => format!("orderDesc(\"{field}\")"),
            Self::Limit(limit) => format!("limit({limit})"),
        }
    }
}

/// One page of documents from a collection listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// Metrics document as stored in the metrics collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub timestamp: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub requests_per_minute: f64,
    pub error_rate: f64,
}

/// Log document as stored in the logs and audit collections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub timestamp: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Filters for log collection queries. `severity = "all"` means no severity
/// filter, matching the dashboard's filter dropdown sentinel.
#[derive(Debug, Clone, Default)]
pub struct LogFilters {
    pub severity: Option<String>,
    pub service: Option<String>,
    pub user_id: Option<String>,
    pub action: Option<String>,
    /// ISO-8601 bounds on the `timestamp` field.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl LogFilters {
    fn to_queries(&self, limit: u32) -> Vec<Query> {
        let mut queries = vec![Query::order_desc("timestamp"), Query::limit(limit)];

        if let Some(severity) = &self.severity {
            if severity != "all" {
                queries.push(Query::equal("severity", severity.as_str()));
            }
        }
        if let Some(service) = &self.service {
            queries.push(Query::equal("service", service.as_str()));
        }
        if let Some(user_id) = &self.user_id {
            queries.push(Query::equal("userId", user_id.as_str()));
        }
        if let Some(action) = &self.action {
            queries.push(Query::equal("action", action.as_str()));
        }
        if let Some(start) = &self.start_date {
            queries.push(Query::greater_than_equal("timestamp", start.as_str()));
        }
        if let Some(end) = &self.end_date {
            queries.push(Query::less_than_equal("timestamp", end.as_str()));
        }

        queries
    }
}

/// Client for the document-store service, implementing [`AuthBackend`] plus
/// the collection reads the dashboard uses for metrics and logs.
#[derive(Clone)]
pub struct DocumentStoreBackend {
    client: reqwest::Client,
    /// Endpoint without a trailing slash, e.g. `https://cloud.appwrite.io/v1`.
    endpoint: String,
    config: DocumentStoreConfig,
    /// Session secret attached as the session header when present.
    session: Arc<RwLock<Option<String>>>,
    guard: SessionGuard,
}

/// Session object returned by email-session creation.
#[derive(Debug, Deserialize)]
struct AccountSession {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    secret: String,
}

/// Account object returned by `GET /account`.
#[derive(Debug, Deserialize)]
struct Account {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    labels: Vec<String>,
}

impl DocumentStoreBackend {
    pub fn new(config: DocumentStoreConfig, guard: SessionGuard) -> Result<Self> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|e| {
            StardashError::config(format!("invalid document-store endpoint '{endpoint}': {e}"))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            config,
            session: Arc::new(RwLock::new(None)),
            guard,
        })
    }

    /// Lists documents from `collection_id` with the given filters.
    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>> {
        let path = self.collection_path(collection_id)?;
        let params: Vec<(&str, String)> =
            queries.iter().map(|q| ("queries[]", q.render())).collect();

        let builder = self.request(Method::GET, &path)?.query(&params);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Creates a document with a server-generated id, injecting the current
    /// timestamp the way the dashboard's log writer does.
    pub async fn create_document(
        &self,
        collection_id: &str,
        mut data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value> {
        data.insert(
            "timestamp".to_string(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );

        let path = self.collection_path(collection_id)?;
        let body = serde_json::json!({ "documentId": "unique()", "data": data });

        let builder = self.request(Method::POST, &path)?.json(&body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Latest metrics documents, newest first.
    pub async fn latest_metrics(&self, limit: u32) -> Result<DocumentList<MetricDocument>> {
        let queries = [Query::order_desc("timestamp"), Query::limit(limit)];
        self.list_documents(&self.config.metrics_collection_id, &queries)
            .await
    }

    /// Metrics documents from the last `hours` hours, oldest first.
    pub async fn metrics_history(&self, hours: i64) -> Result<DocumentList<MetricDocument>> {
        let cutoff = (chrono::Utc::now() - chrono::Duration::hours(hours)).to_rfc3339();
        let queries = [
            Query::greater_than("timestamp", cutoff),
            Query::order_asc("timestamp"),
            Query::limit(HISTORY_LIMIT),
        ];
        self.list_documents(&self.config.metrics_collection_id, &queries)
            .await
    }

    /// Filtered system logs, newest first.
    pub async fn logs(&self, filters: &LogFilters, limit: u32) -> Result<DocumentList<LogDocument>> {
        let queries = filters.to_queries(limit);
        self.list_documents(&self.config.logs_collection_id, &queries)
            .await
    }

    /// Filtered audit logs, newest first.
    pub async fn audit_logs(
        &self,
        filters: &LogFilters,
        limit: u32,
    ) -> Result<DocumentList<LogDocument>> {
        let queries = filters.to_queries(limit);
        self.list_documents(&self.config.audit_collection_id, &queries)
            .await
    }

    /// Appends a log document to the logs collection.
    pub async fn create_log(
        &self,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.create_document(&self.config.logs_collection_id, data)
            .await
    }

    fn collection_path(&self, collection_id: &str) -> Result<String> {
        if self.config.database_id.is_empty() || collection_id.is_empty() {
            return Err(StardashError::config(
                "document store database/collection ids are not configured",
            ));
        }
        Ok(format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id, collection_id
        ))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let full = format!("{}{}", self.endpoint, path);
        let url = Url::parse(&full)
            .map_err(|e| StardashError::config(format!("invalid URL '{full}': {e}")))?;

        let mut builder = self
            .client
            .request(method, url)
            .timeout(REQUEST_TIMEOUT)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Appwrite-Project", &self.config.project_id);

        if let Some(secret) = self.session.read().unwrap().as_deref() {
            builder = builder.header("X-Appwrite-Session", secret);
        }

        Ok(builder)
    }

    /// Same status policy as the REST client: 401 runs the expiry side
    /// effect before the error reaches the caller.
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
            tracing::debug!(status = status.as_u16(), %message, "document-store request failed");
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

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }

        format!("HTTP {status}")
    }
}

#[async_trait]
impl AuthBackend for DocumentStoreBackend {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let body = serde_json::json!({ "email": username, "password": password });
        let builder = self.request(Method::POST, "/account/sessions/email")?.json(&body);
        let response = self.send(builder).await?;
        let session: AccountSession = Self::decode(response).await?;

        // Newer servers return a usable secret; older ones only the id.
        Ok(if session.secret.is_empty() {
            session.id
        } else {
            session.secret
        })
    }

    async fn current_user(&self) -> Result<User> {
        let builder = self.request(Method::GET, "/account")?;
        let response = self.send(builder).await?;
        let account: Account = Self::decode(response).await?;

        Ok(User {
            id: account.id,
            username: if account.name.is_empty() {
                account.email
            } else {
                account.name
            },
            roles: account.labels,
        })
    }

    async fn logout(&self) -> Result<()> {
        let builder = self.request(Method::DELETE, "/account/sessions/current")?;
        self.send(builder).await?;
        Ok(())
    }

    fn set_session_token(&self, token: Option<String>) {
        *self.session.write().unwrap() = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardash_core::navigator::{MemoryNavigator, Route};
    use stardash_core::token::MemoryTokenStore;

    fn backend() -> DocumentStoreBackend {
        let config = DocumentStoreConfig {
            endpoint: "https://docs.example.com/v1".to_string(),
            project_id: "proj".to_string(),
            database_id: "db".to_string(),
            metrics_collection_id: "metrics".to_string(),
            logs_collection_id: "logs".to_string(),
            audit_collection_id: "audit_logs".to_string(),
        };
        let guard = SessionGuard::new(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemoryNavigator::new(Route::Login)),
        );
        DocumentStoreBackend::new(config, guard).unwrap()
    }

    #[test]
    fn test_query_rendering() {
        assert_eq!(
            Query::equal("severity", "error").render(),
            r#"equal("severity", ["error"])"#
        );
        assert_eq!(
            Query::greater_than("timestamp", "2025-01-01T00:00:00Z").render(),
            r#"greaterThan("timestamp", ["2025-01-01T00:00:00Z"])"#
        );
        assert_eq!(Query::order_desc("timestamp").render(), r#"orderDesc("timestamp")"#);
        assert_eq!(Query::limit(50).render(), "limit(50)");
    }

    #[test]
    fn test_numeric_query_values_are_unquoted() {
        assert_eq!(Query::equal("code", 42).render(), r#"equal("code", [42])"#);
    }

    #[test]
    fn test_log_filters_skip_all_severity_sentinel() {
        let filters = LogFilters {
            severity: Some("all".to_string()),
            service: Some("api".to_string()),
            ..Default::default()
        };

        let queries = filters.to_queries(50);
        assert_eq!(
            queries,
            vec![
                Query::order_desc("timestamp"),
                Query::limit(50),
                Query::equal("service", "api"),
            ]
        );
    }

    #[test]
    fn test_log_filters_date_bounds() {
        let filters = LogFilters {
            start_date: Some("2025-01-01T00:00:00Z".to_string()),
            end_date: Some("2025-02-01T00:00:00Z".to_string()),
            ..Default::default()
        };

        let queries = filters.to_queries(25);
        assert!(queries.contains(&Query::greater_than_equal(
            "timestamp",
            "2025-01-01T00:00:00Z"
        )));
        assert!(queries.contains(&Query::less_than_equal("timestamp", "2025-02-01T00:00:00Z")));
    }

    #[test]
    fn test_requests_carry_project_and_session_headers() {
        let backend = backend();
        backend.set_session_token(Some("S1".to_string()));

        let request = backend
            .request(Method::GET, "/account")
            .unwrap()
            .build()
            .unwrap();

        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        assert_eq!(header("x-appwrite-project").as_deref(), Some("proj"));
        assert_eq!(header("x-appwrite-session").as_deref(), Some("S1"));
        assert_eq!(request.url().as_str(), "https://docs.example.com/v1/account");
    }

    #[test]
    fn test_session_header_absent_when_logged_out() {
        let backend = backend();

        let request = backend
            .request(Method::GET, "/account")
            .unwrap()
            .build()
            .unwrap();

        assert!(request.headers().get("x-appwrite-session").is_none());
    }

    #[test]
    fn test_collection_path_requires_configuration() {
        let mut backend = backend();
        backend.config.database_id = String::new();

        assert!(backend.collection_path("metrics").is_err());
    }

    #[test]
    fn test_document_parsing_handles_store_metadata() {
        let list: DocumentList<MetricDocument> = serde_json::from_str(
            r#"{"total":1,"documents":[{"$id":"m1","timestamp":"2025-01-01T00:00:00Z",
                "cpuUsage":12.5,"memoryUsage":40.0,"requestsPerMinute":210.0,"errorRate":0.4}]}"#,
        )
        .unwrap();

        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "m1");
        assert_eq!(list.documents[0].cpu_usage, 12.5);
    }
}
