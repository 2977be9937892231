//! Token storage seam.
//!
//! The session token is an opaque credential string held in exactly one
//! durable slot. All reads and writes go through the [`TokenStore`] trait
//! so no component touches ambient storage directly.

use std::sync::RwLock;

/// Durable slot for the single session credential.
///
/// Implementations must make `get` infallible: storage problems degrade to
/// "absent" rather than surfacing an error, since a missing token simply
/// means an anonymous session.
pub trait TokenStore: Send + Sync {
    /// Persists `token`, replacing any previous value. No format validation.
    fn set(&self, token: &str);

    /// Returns the stored token, or `None` when absent. Never fails.
    fn get(&self) -> Option<String>;

    /// Removes the stored token. Idempotent.
    fn clear(&self);
}

/// Process-local token store.
///
/// Used by tests and as a fallback when no durable location is available;
/// the durable implementation lives in `stardash-infrastructure`.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, token: &str) {
        *self.slot.write().unwrap() = Some(token.to_string());
    }

    fn get(&self) -> Option<String> {
        self.slot.read().unwrap().clone()
    }

    fn clear(&self) {
        *self.slot.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_token() {
        let store = MemoryTokenStore::new();
        store.set("T1");
        assert_eq!(store.get(), Some("T1".to_string()));

        // Overwrite replaces the previous value
        store.set("T2");
        assert_eq!(store.get(), Some("T2".to_string()));
    }

    #[test]
    fn test_get_is_absent_initially() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_clear_removes_and_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.set("T1");
        store.clear();
        assert_eq!(store.get(), None);

        // Clearing an already-empty slot is a no-op
        store.clear();
        assert_eq!(store.get(), None);
    }
}
