//! Team repository trait

use async_trait::async_trait;

use super::entity::{NewTeam, Team};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository for managing teams
///
/// Implementations must enforce code uniqueness atomically with the insert
/// and report a violation as `DomainError::Conflict`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Persist a new team and return it with its assigned id
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError>;

    /// Get a team by its unique code
    async fn get_by_code(&self, code: &str) -> Result<Option<Team>, DomainError>;

    /// List all teams ordered by id
    async fn list(&self) -> Result<Vec<Team>, DomainError>;
}
