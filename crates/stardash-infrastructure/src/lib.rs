pub mod config_service;
pub mod file_token_store;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::file_token_store::FileTokenStore;
pub use crate::paths::StardashPaths;
