//! System health and metrics endpoints.

use crate::dto::{MetricsSample, SystemHealth, SystemMetrics};
use crate::http::ApiClient;
use stardash_core::error::Result;

/// Read-only system status surface consumed by the dashboard page.
#[derive(Clone)]
pub struct SystemService {
    client: ApiClient,
}

impl SystemService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /system/health`
    pub async fn health(&self) -> Result<SystemHealth> {
        self.client.get("/system/health").await
    }

    /// `GET /system/metrics`
    pub async fn metrics(&self) -> Result<SystemMetrics> {
        self.client.get("/system/metrics").await
    }

    /// `GET /system/metrics/history?timeframe=` — e.g. `"1h"`, `"24h"`, `"7d"`.
    pub async fn metrics_history(&self, timeframe: &str) -> Result<Vec<MetricsSample>> {
        self.client
            .get_query("/system/metrics/history", &[("timeframe", timeframe)])
            .await
    }
}
