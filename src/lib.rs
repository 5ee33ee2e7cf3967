//! Team Auth API
//!
//! A small team registry behind username/password login:
//! - Argon2id password storage
//! - JWT sessions bound to a client fingerprint
//! - Double-submit CSRF tokens on state-changing requests
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, AuthServiceTrait, CookieSettings, TeamServiceTrait};
use infrastructure::{
    auth::{JwtConfig, JwtService, SessionGuard, TokenIssuer},
    storage::{create_pool, run_migrations, PostgresConfig, StorageType},
    team::{InMemoryTeamRepository, PostgresTeamRepository, TeamService},
    user::{Argon2Hasher, AuthService, InMemoryUserRepository, PostgresUserRepository},
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_settings(
        &config.auth.secret,
        &config.auth.algorithm,
        config.auth.access_token_expire_minutes,
    )?;

    if config.auth.uses_default_secret() {
        warn!("Using the default JWT secret; set APP__AUTH__SECRET before exposing this service");
    }

    let jwt_service: Arc<dyn TokenIssuer> = Arc::new(JwtService::new(jwt_config));
    let session_guard = Arc::new(SessionGuard::from_header_names(
        &config.session.fingerprint_headers,
    )?);
    let hasher = Arc::new(Argon2Hasher::new());
    let cookies = CookieSettings {
        secure: config.session.secure_cookies,
    };

    info!("Storage backend: {}", config.storage.backend);

    let state = match config.storage.backend {
        StorageType::InMemory => {
            let auth_service: Arc<dyn AuthServiceTrait> = Arc::new(AuthService::new(
                Arc::new(InMemoryUserRepository::new()),
                hasher,
                jwt_service.clone(),
            ));
            let team_service: Arc<dyn TeamServiceTrait> =
                Arc::new(TeamService::new(Arc::new(InMemoryTeamRepository::new())));

            AppState::new(auth_service, team_service, jwt_service, session_guard)
        }
        StorageType::Postgres => {
            let pool = create_pool(
                &PostgresConfig::new(&config.storage.database_url)
                    .with_max_connections(config.storage.max_connections),
            )
            .await?;

            let applied = run_migrations(&pool).await?;
            info!(applied, "Database schema up to date");

            let auth_service: Arc<dyn AuthServiceTrait> = Arc::new(AuthService::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                hasher,
                jwt_service.clone(),
            ));
            let team_service: Arc<dyn TeamServiceTrait> = Arc::new(TeamService::new(Arc::new(
                PostgresTeamRepository::new(pool.clone()),
            )));

            AppState::new(auth_service, team_service, jwt_service, session_guard).with_pool(pool)
        }
    };

    Ok(state.with_cookies(cookies))
}
