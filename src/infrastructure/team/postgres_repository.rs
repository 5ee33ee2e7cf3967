//! PostgreSQL team repository implementation

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::team::{NewTeam, Team, TeamId, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query("INSERT INTO teams (code, name) VALUES ($1, $2) RETURNING id")
            .bind(&team.code)
            .bind(&team.name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict(format!("Team code '{}' already exists", team.code))
                } else {
                    DomainError::storage(format!("Failed to create team: {}", e))
                }
            })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| DomainError::storage(format!("Failed to read team id: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit team: {}", e)))?;

        Ok(Team::from_new(TeamId::new(id), team))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query("SELECT id, code, name FROM teams WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get team by code: {}", e)))?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        let rows = sqlx::query("SELECT id, code, name FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list teams: {}", e)))?;

        rows.iter().map(row_to_team).collect()
    }
}

fn row_to_team(row: &PgRow) -> Result<Team, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid team row: {}", e));

    let id: i64 = row.try_get("id").map_err(read)?;
    let code: String = row.try_get("code").map_err(read)?;
    let name: String = row.try_get("name").map_err(read)?;

    Ok(Team::new(TeamId::new(id), code, name))
}
