//! User repository trait

use async_trait::async_trait;

use super::entity::{NewUser, User};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
///
/// Implementations must enforce username uniqueness atomically with the
/// insert and report a violation as `DomainError::Conflict`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned id
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Get a user by username (for login)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }
}
