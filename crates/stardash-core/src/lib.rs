pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigator;
pub mod token;
pub mod user;

// Re-export common error type
pub use error::{Result, StardashError};

pub use auth::{AuthSession, AuthState};
pub use backend::AuthBackend;
pub use guard::SessionGuard;
pub use navigator::{MemoryNavigator, Navigator, Route};
pub use token::{MemoryTokenStore, TokenStore};
pub use user::User;
