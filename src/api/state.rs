//! Application state for shared services

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::team::TeamRepository;
use crate::domain::user::UserRepository;
use crate::domain::{DomainError, Team, User};
use crate::infrastructure::auth::{Session, SessionBinding, SessionGuard, TokenIssuer};
use crate::infrastructure::storage;
use crate::infrastructure::team::TeamService;
use crate::infrastructure::user::{AccessToken, AuthService, PasswordHasher};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub team_service: Arc<dyn TeamServiceTrait>,
    pub jwt_service: Arc<dyn TokenIssuer>,
    pub session_guard: Arc<SessionGuard>,
    pub cookies: CookieSettings,
    /// Connection pool when running on PostgreSQL
    pub pool: Option<PgPool>,
}

/// Attributes applied to session cookies
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

/// Trait for registration and login
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError>;
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        binding: &SessionBinding,
    ) -> Result<AccessToken, DomainError>;
}

/// Trait for team operations
#[async_trait::async_trait]
pub trait TeamServiceTrait: Send + Sync {
    async fn create_team(
        &self,
        session: &Session,
        code: &str,
        name: &str,
    ) -> Result<Team, DomainError>;
    async fn list_teams(&self, session: &Session) -> Result<Vec<Team>, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> AuthServiceTrait for AuthService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        AuthService::register(self, username, password).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        binding: &SessionBinding,
    ) -> Result<AccessToken, DomainError> {
        AuthService::authenticate(self, username, password, binding).await
    }
}

#[async_trait::async_trait]
impl<R: TeamRepository + 'static> TeamServiceTrait for TeamService<R> {
    async fn create_team(
        &self,
        session: &Session,
        code: &str,
        name: &str,
    ) -> Result<Team, DomainError> {
        TeamService::create_team(self, session, code, name).await
    }

    async fn list_teams(&self, session: &Session) -> Result<Vec<Team>, DomainError> {
        TeamService::list_teams(self, session).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        auth_service: Arc<dyn AuthServiceTrait>,
        team_service: Arc<dyn TeamServiceTrait>,
        jwt_service: Arc<dyn TokenIssuer>,
        session_guard: Arc<SessionGuard>,
    ) -> Self {
        Self {
            auth_service,
            team_service,
            jwt_service,
            session_guard,
            cookies: CookieSettings::default(),
            pool: None,
        }
    }

    pub fn with_cookies(mut self, cookies: CookieSettings) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Check the backing store answers
    pub async fn check_storage(&self) -> Result<(), DomainError> {
        match &self.pool {
            Some(pool) => storage::ping(pool).await,
            None => Ok(()),
        }
    }

    /// Close the connection pool, if any
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
