//! Authenticated principal domain model.

use serde::{Deserialize, Serialize};

/// The authenticated principal as returned by the backend's
/// "who am I" operation.
///
/// Roles are plain string tags used for coarse-grained authorization
/// checks; ordering is irrelevant and duplicates carry no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    /// Returns true iff this user carries the given role tag.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
