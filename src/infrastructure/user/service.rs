//! Auth service for registration and login

use std::sync::Arc;

use chrono::Duration;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::domain::user::{validate_password, validate_username, NewUser, User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::{SessionBinding, TokenIssuer};

use super::password::PasswordHasher;

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const DECOY_PASSWORD: &str = "decoy-password";

/// A signed session token handed out at login
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub ttl: Duration,
}

impl AccessToken {
    /// Lifetime in whole seconds, suitable for a cookie `Max-Age`
    pub fn max_age_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Registration and login
#[derive(Debug)]
pub struct AuthService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<dyn TokenIssuer>,
    /// Hash verified against when the username is unknown, so both
    /// failure paths cost one password verification
    decoy_hash: OnceCell<String>,
}

impl<R: UserRepository, H: PasswordHasher + 'static> AuthService<R, H> {
    /// Create a new auth service
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Register a new user
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let password_hash = self.hash_password(password).await?;

        // The store re-checks uniqueness for concurrent registrations
        let user = self
            .repository
            .create(NewUser::new(username, password_hash))
            .await?;

        info!(user_id = %user.id(), username = %user.username(), "Registered user");

        Ok(user)
    }

    /// Verify credentials and issue a session token bound to `binding`
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        binding: &SessionBinding,
    ) -> Result<AccessToken, DomainError> {
        let Some(user) = self.repository.get_by_username(username).await? else {
            self.burn_verification(password).await;
            debug!(username = %username, "Login for unknown user");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.verify_password(password, user.password_hash()).await {
            warn!(username = %username, "Login with wrong password");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }

        let ttl = self.tokens.default_ttl();
        let token = self.tokens.issue_bound(user.username(), ttl, binding)?;

        info!(user_id = %user.id(), username = %user.username(), "User logged in");

        Ok(AccessToken { token, ttl })
    }

    // Argon2 is CPU-bound; keep it off the async workers
    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .unwrap_or(false)
    }

    async fn burn_verification(&self, password: &str) {
        let decoy = match self.decoy_hash.get() {
            Some(hash) => hash.clone(),
            None => match self.hash_password(DECOY_PASSWORD).await {
                Ok(hash) => self.decoy_hash.get_or_init(|| hash).clone(),
                Err(_) => return,
            },
        };

        let _ = self.verify_password(password, &decoy).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};
    use crate::infrastructure::auth::{Fingerprint, JwtConfig, JwtService};
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository};

    fn tokens() -> Arc<dyn TokenIssuer> {
        Arc::new(JwtService::new(JwtConfig::new("test-secret", 60)))
    }

    fn create_service() -> AuthService<InMemoryUserRepository, Argon2Hasher> {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            tokens(),
        )
    }

    fn binding() -> SessionBinding {
        SessionBinding::new("csrf", Fingerprint::from_raw("fp"))
    }

    #[tokio::test]
    async fn test_register_user() {
        let service = create_service();

        let user = service.register("user1", "pass").await.unwrap();

        assert_eq!(user.id().value(), 1);
        assert_eq!(user.username(), "user1");
        assert_ne!(user.password_hash(), "pass");
        assert!(user.password_hash().starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = create_service();
        service.register("user1", "pass").await.unwrap();

        let result = service.register("user1", "other").await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_invalid_input() {
        let service = create_service();

        assert!(matches!(
            service.register("", "pass").await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.register("user one", "pass").await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.register("user1", "").await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_conflict_surfaces_for_racing_writer() {
        let mut repo = MockUserRepository::new();
        repo.expect_username_exists().returning(|_| Ok(false));
        repo.expect_create()
            .returning(|_| Err(DomainError::conflict("Username 'user1' already exists")));

        let service = AuthService::new(Arc::new(repo), Arc::new(Argon2Hasher::new()), tokens());

        let result = service.register("user1", "pass").await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_issues_bound_token() {
        let service = create_service();
        service.register("user1", "pass").await.unwrap();
        let binding = binding();

        let access = service.authenticate("user1", "pass", &binding).await.unwrap();

        let claims = tokens().validate(&access.token).unwrap();
        assert_eq!(claims.subject(), "user1");
        assert_eq!(claims.csrf, Some(binding.csrf_digest()));
        assert_eq!(claims.fgp.as_deref(), Some("fp"));
        assert_eq!(access.max_age_seconds(), 3600);
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let service = create_service();
        service.register("user1", "pass").await.unwrap();

        let wrong_password = service
            .authenticate("user1", "wrong", &binding())
            .await
            .unwrap_err();
        let unknown_user = service
            .authenticate("nobody", "pass", &binding())
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, DomainError::Unauthorized { .. }));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_storage_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .returning(|_| Err(DomainError::storage("connection refused")));

        let service = AuthService::new(Arc::new(repo), Arc::new(Argon2Hasher::new()), tokens());

        let result = service.authenticate("user1", "pass", &binding()).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    /// Records which threads hashing and verification ran on
    #[derive(Debug, Default)]
    struct ThreadRecordingHasher {
        threads: Mutex<Vec<ThreadId>>,
    }

    impl ThreadRecordingHasher {
        fn record(&self) {
            self.threads.lock().unwrap().push(thread::current().id());
        }
    }

    impl PasswordHasher for ThreadRecordingHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            self.record();
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            self.record();
            hash == format!("plain:{}", password)
        }
    }

    #[tokio::test]
    async fn test_hashing_runs_off_the_async_thread() {
        let hasher = Arc::new(ThreadRecordingHasher::default());
        let service = AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&hasher),
            tokens(),
        );

        service.register("user1", "pass").await.unwrap();
        service.authenticate("user1", "pass", &binding()).await.unwrap();
        service
            .authenticate("nobody", "pass", &binding())
            .await
            .unwrap_err();

        let async_thread = thread::current().id();
        let threads = hasher.threads.lock().unwrap();

        // register, login verify, decoy hash, decoy verify
        assert_eq!(threads.len(), 4);
        assert!(threads.iter().all(|id| *id != async_thread));
    }
}
