//! User entity and related types

use serde::{Deserialize, Serialize};

/// Store-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Registered user. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    /// Argon2 PHC string - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Attach a store-assigned id to a pending user
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self::new(id, new_user.username, new_user.password_hash)
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_new() {
        let user = User::from_new(UserId::new(7), NewUser::new("user1", "$argon2id$hash"));

        assert_eq!(user.id().value(), 7);
        assert_eq!(user.username(), "user1");
        assert_eq!(user.password_hash(), "$argon2id$hash");
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = User::new(UserId::new(1), "user1", "hashed_password");

        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":1,"username":"user1"}"#);
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::new(42).to_string(), "42");
    }
}
