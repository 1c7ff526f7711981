use serde::Serialize;
use uuid::Uuid;

use super::value_objects::Email;

/// A person on a team's roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub position: String,
    pub email: Email,
}

impl Member {
    /// Creates a member with a freshly generated id
    pub fn new(name: impl Into<String>, position: impl Into<String>, email: Email) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            position: position.into(),
            email,
        }
    }

    /// Case-insensitive substring match over name, position and email.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.position.to_lowercase().contains(needle)
            || self.email.as_str().to_lowercase().contains(needle)
    }
}
