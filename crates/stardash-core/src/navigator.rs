//! Navigation seam.
//!
//! The session layer performs navigation side effects (redirect to login on
//! expiry, redirect home after login). Routing itself belongs to the UI
//! shell, so the session layer only talks to the [`Navigator`] trait and
//! tests can observe navigation without a real navigation stack.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// The views the session layer can navigate to or inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Login,
    Home,
    Dashboard,
    Logs,
    Settings,
}

impl Route {
    /// Stable path string for the route, matching the REST dashboard's URLs.
    pub fn as_path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Dashboard => "/dashboard",
            Route::Logs => "/logs",
            Route::Settings => "/settings",
        }
    }
}

/// Navigation capability used by the session layer.
pub trait Navigator: Send + Sync {
    /// Returns the current location.
    fn current(&self) -> Route;

    /// Moves the current location to `route`.
    fn navigate(&self, route: Route);
}

/// In-process navigator holding the current route in memory.
///
/// A real UI shell provides its own implementation; this one backs the
/// headless binary and tests.
pub struct MemoryNavigator {
    current: RwLock<Route>,
}

impl MemoryNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        *self.current.read().unwrap()
    }

    fn navigate(&self, route: Route) {
        *self.current.write().unwrap() = route;
    }
}
