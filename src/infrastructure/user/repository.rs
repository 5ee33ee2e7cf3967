//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: BTreeMap<i64, User>,
    /// Index for username -> user ID lookup
    username_index: HashMap<String, i64>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
///
/// The uniqueness check and the insert happen under one write lock, so
/// concurrent registrations of the same username yield exactly one winner.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.username_index.contains_key(&user.username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        table.last_id += 1;
        let id = table.last_id;
        let user = User::from_new(UserId::new(id), user);

        table.username_index.insert(user.username().to_string(), id);
        table.users.insert(id, user.clone());

        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(NewUser::new("alice", "h1")).await.unwrap();
        let second = repo.create(NewUser::new("bob", "h2")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(NewUser::new("alice", "h1")).await.unwrap();

        let result = repo.create(NewUser::new("alice", "h2")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        let kept = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept.password_hash(), "h1");
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(NewUser::new("alice", "h1")).await.unwrap();

        let found = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id(), created.id());
        assert_eq!(found.password_hash(), "h1");

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
        assert!(repo.username_exists("alice").await.unwrap());
        assert!(!repo.username_exists("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_registration_has_single_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(NewUser::new("racer", format!("h{}", i))).await
                })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::Conflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }
}
