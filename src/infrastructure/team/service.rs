//! Team service for team management

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::team::{validate_team_code, validate_team_name, NewTeam, Team, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::Session;

/// Team service for creating and listing teams
///
/// Every operation takes the authorized [`Session`]; creation additionally
/// requires that the request passed the CSRF check.
#[derive(Debug)]
pub struct TeamService<R: TeamRepository> {
    repository: Arc<R>,
}

impl<R: TeamRepository> TeamService<R> {
    /// Create a new team service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new team
    pub async fn create_team(
        &self,
        session: &Session,
        code: &str,
        name: &str,
    ) -> Result<Team, DomainError> {
        session.require_csrf()?;

        validate_team_code(code).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_team_name(name).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.get_by_code(code).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Team code '{}' already exists",
                code
            )));
        }

        let team = self.repository.create(NewTeam::new(code, name)).await?;

        info!(
            team_id = %team.id(),
            created_by = %session.subject(),
            "Created team"
        );

        Ok(team)
    }

    /// List all teams ordered by id
    pub async fn list_teams(&self, session: &Session) -> Result<Vec<Team>, DomainError> {
        debug!(subject = %session.subject(), "Listing teams");
        self.repository.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::{MockTeamRepository, TeamId};
    use crate::infrastructure::team::InMemoryTeamRepository;

    fn create_service() -> TeamService<InMemoryTeamRepository> {
        TeamService::new(Arc::new(InMemoryTeamRepository::new()))
    }

    fn verified() -> Session {
        Session::for_tests("user1", true)
    }

    #[tokio::test]
    async fn test_create_team() {
        let service = create_service();

        let team = service.create_team(&verified(), "T1", "Team 1").await.unwrap();

        assert_eq!(team.id().value(), 1);
        assert_eq!(team.code(), "T1");
        assert_eq!(team.name(), "Team 1");
    }

    #[tokio::test]
    async fn test_create_team_requires_csrf_verified_session() {
        let service = create_service();
        let unverified = Session::for_tests("user1", false);

        let result = service.create_team(&unverified, "T1", "Team 1").await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
        assert!(service.list_teams(&verified()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_team_duplicate_code() {
        let service = create_service();
        service.create_team(&verified(), "T1", "Team 1").await.unwrap();

        let result = service.create_team(&verified(), "T1", "Again").await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_team_validation() {
        let service = create_service();

        assert!(matches!(
            service.create_team(&verified(), "", "Team").await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.create_team(&verified(), "T1", &"x".repeat(101)).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_markup_is_stored_verbatim() {
        let service = create_service();

        let team = service
            .create_team(&verified(), "<script>alert(1)</script>", "Name")
            .await
            .unwrap();

        assert_eq!(team.code(), "<script>alert(1)</script>");
    }

    #[tokio::test]
    async fn test_list_teams_uses_repository_order() {
        let mut repo = MockTeamRepository::new();
        repo.expect_list().times(1).returning(|| {
            Ok(vec![
                Team::new(TeamId::new(1), "A", "Alpha"),
                Team::new(TeamId::new(2), "B", "Beta"),
            ])
        });

        let service = TeamService::new(Arc::new(repo));
        let session = Session::for_tests("user1", false);

        let teams = service.list_teams(&session).await.unwrap();

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].code(), "A");
    }

    #[tokio::test]
    async fn test_store_conflict_surfaces_for_racing_writer() {
        let mut repo = MockTeamRepository::new();
        repo.expect_get_by_code().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_| Err(DomainError::conflict("Team code 'T1' already exists")));

        let service = TeamService::new(Arc::new(repo));

        let result = service.create_team(&verified(), "T1", "Team 1").await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }
}
