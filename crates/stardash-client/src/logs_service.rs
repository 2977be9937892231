//! System and audit log endpoints.

use crate::dto::{AuditLogEntry, AuditLogQuery, LogEntry, LogPage, LogQuery};
use crate::http::ApiClient;
use stardash_core::error::Result;

/// Paginated log listings. Filter state stays with the calling page; this
/// service just forwards whatever query the caller built.
#[derive(Clone)]
pub struct LogsService {
    client: ApiClient,
}

impl LogsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /logs`
    pub async fn system_logs(&self, query: &LogQuery) -> Result<LogPage<LogEntry>> {
        self.client.get_query("/logs", query).await
    }

    /// `GET /logs/audit`
    pub async fn audit_logs(&self, query: &AuditLogQuery) -> Result<LogPage<AuditLogEntry>> {
        self.client.get_query("/logs/audit", query).await
    }
}
