//! Wire types for the StarAPI REST surface.
//!
//! Field names follow the API's camelCase convention. These are plain data
//! carriers; the rendering layer consumes them as-is.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// ============================================================================
// System health and metrics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub name: String,
    pub status: HealthStatus,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(default)]
    pub services: Vec<ServiceHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub active_connections: u64,
    pub requests_per_minute: f64,
    pub error_rate: f64,
    pub timestamp: String,
}

/// One point of the metrics history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    pub timestamp: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub requests_per_minute: f64,
    pub error_rate: f64,
}

// ============================================================================
// Logs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub severity: String,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: String,
    pub user_id: String,
    pub action: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Query parameters for `GET /logs`. Unset fields are omitted from the
/// query string. Date ordering is the caller's concern.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Query parameters for `GET /logs/audit`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub site_name: String,
    pub maintenance_mode: bool,
    pub log_retention_days: u32,
    pub default_timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub session_timeout_minutes: u32,
    pub password_min_length: u32,
    pub mfa_required: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_enabled: bool,
    #[serde(default)]
    pub email_recipients: Vec<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    pub alert_on_error_rate: f64,
}

// ============================================================================
// User administration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

// ============================================================================
// API tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: String,
    pub name: String,
    pub locked: bool,
    pub created_at: String,
    #[serde(default)]
    pub last_used_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApiToken {
    pub name: String,
}

/// Response to token creation; the secret is only returned here, once.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiToken {
    pub id: String,
    pub name: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_query_omits_unset_fields() {
        let query = LogQuery {
            severity: Some("error".to_string()),
            limit: Some(50),
            ..Default::default()
        };

        let encoded = serde_json::to_value(&query).unwrap();
        let map = encoded.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["severity"], "error");
        assert_eq!(map["limit"], 50);
    }

    #[test]
    fn test_audit_query_uses_camel_case_names() {
        let query = AuditLogQuery {
            user_id: Some("42".to_string()),
            start_date: Some("2025-01-01".to_string()),
            ..Default::default()
        };

        let encoded = serde_json::to_value(&query).unwrap();
        let map = encoded.as_object().unwrap();
        assert!(map.contains_key("userId"));
        assert!(map.contains_key("startDate"));
        assert!(!map.contains_key("user_id"));
    }

    #[test]
    fn test_health_status_wire_casing() {
        let health: SystemHealth = serde_json::from_str(
            r#"{"status":"degraded","version":"1.4.2","uptimeSeconds":86400,
                "services":[{"name":"db","status":"healthy","latencyMs":4.2}]}"#,
        )
        .unwrap();

        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.services[0].status, HealthStatus::Healthy);
    }
}
