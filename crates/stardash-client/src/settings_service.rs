//! System settings endpoints.

use crate::dto::{NotificationSettings, SecuritySettings, SystemSettings};
use crate::http::ApiClient;
use stardash_core::error::Result;

/// Read/update surface for the settings pages. Each update returns the
/// settings as the server now holds them.
#[derive(Clone)]
pub struct SettingsService {
    client: ApiClient,
}

impl SettingsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /system/settings`
    pub async fn settings(&self) -> Result<SystemSettings> {
        self.client.get("/system/settings").await
    }

    /// `PUT /system/settings`
    pub async fn update_settings(&self, settings: &SystemSettings) -> Result<SystemSettings> {
        self.client.put("/system/settings", settings).await
    }

    /// `GET /system/security-settings`
    pub async fn security_settings(&self) -> Result<SecuritySettings> {
        self.client.get("/system/security-settings").await
    }

    /// `PUT /system/security-settings`
    pub async fn update_security_settings(
        &self,
        settings: &SecuritySettings,
    ) -> Result<SecuritySettings> {
        self.client.put("/system/security-settings", settings).await
    }

    /// `GET /system/notification-settings`
    pub async fn notification_settings(&self) -> Result<NotificationSettings> {
        self.client.get("/system/notification-settings").await
    }

    /// `PUT /system/notification-settings`
    pub async fn update_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings> {
        self.client.put("/system/notification-settings", settings).await
    }
}
