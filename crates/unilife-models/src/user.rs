//! Row ownership.
//!
//! Every course, class and task row carries the identity-provider user id
//! of its owner. Queries are always scoped to a single [`UserId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity-provider user identifier (the token `sub` claim).
///
/// # Examples
///
/// ```
/// use unilife_models::UserId;
///
/// let id = UserId::new("user_2abc");
/// assert_eq!(id.to_string(), "user_2abc");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user identifier.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::new("user_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user_42\"");
        let back: UserId = serde_json::from_str("\"user_42\"").unwrap();
        assert_eq!(back, id);
    }
}
