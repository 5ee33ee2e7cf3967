//! In-memory team repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::team::{NewTeam, Team, TeamId, TeamRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct TeamTable {
    teams: BTreeMap<i64, Team>,
    code_index: HashMap<String, i64>,
    last_id: i64,
}

/// In-memory implementation of TeamRepository
#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    table: RwLock<TeamTable>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut table = self.table.write().await;

        if table.code_index.contains_key(&team.code) {
            return Err(DomainError::conflict(format!(
                "Team code '{}' already exists",
                team.code
            )));
        }

        table.last_id += 1;
        let id = table.last_id;
        let team = Team::from_new(TeamId::new(id), team);

        table.code_index.insert(team.code().to_string(), id);
        table.teams.insert(id, team.clone());

        Ok(team)
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Team>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .code_index
            .get(code)
            .and_then(|id| table.teams.get(id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let table = self.table.read().await;
        Ok(table.teams.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_in_id_order() {
        let repo = InMemoryTeamRepository::new();

        repo.create(NewTeam::new("T2", "Second")).await.unwrap();
        repo.create(NewTeam::new("T1", "First")).await.unwrap();

        let teams = repo.list().await.unwrap();
        let ids: Vec<i64> = teams.iter().map(|t| t.id().value()).collect();
        let codes: Vec<&str> = teams.iter().map(|t| t.code()).collect();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(codes, vec!["T2", "T1"]);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let repo = InMemoryTeamRepository::new();
        repo.create(NewTeam::new("T1", "Team 1")).await.unwrap();

        let result = repo.create(NewTeam::new("T1", "Other")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_code() {
        let repo = InMemoryTeamRepository::new();
        let created = repo.create(NewTeam::new("T1", "Team 1")).await.unwrap();

        let by_code = repo.get_by_code("T1").await.unwrap().unwrap();

        assert_eq!(by_code, created);
        assert!(repo.get_by_code("missing").await.unwrap().is_none());
    }
}
