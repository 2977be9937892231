pub mod admin_service;
pub mod document;
pub mod dto;
pub mod http;
pub mod logs_service;
pub mod rest_backend;
pub mod settings_service;
pub mod system_service;

pub use crate::admin_service::{ApiTokenService, UserAdminService};
pub use crate::document::{DocumentStoreBackend, LogFilters, Query};
pub use crate::http::ApiClient;
pub use crate::logs_service::LogsService;
pub use crate::rest_backend::RestAuthBackend;
pub use crate::settings_service::SettingsService;
pub use crate::system_service::SystemService;
