use std::fmt;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::StorageType;

/// Secret shipped in the defaults; startup warns when it is still in use
pub const DEFAULT_JWT_SECRET: &str = "changeme123";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageSettings,
    pub session: SessionConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Session token signing settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .finish()
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageType,
    pub database_url: String,
    pub max_connections: u32,
}

/// Cookie and fingerprint settings for issued sessions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Mark session cookies `Secure` (HTTPS only)
    pub secure_cookies: bool,
    /// Request headers hashed into the client fingerprint
    pub fingerprint_headers: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 60,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageType::InMemory,
            database_url: "postgres://localhost/team_auth_api".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            fingerprint_headers: vec!["user-agent".to_string()],
        }
    }
}

impl AppConfig {
    /// Layer `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        Self::from_builder(builder)
    }

    /// Finish a builder with the environment layer and deserialize
    pub fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        Self::from_builder_with_env(builder, environment())
    }

    fn from_builder_with_env(
        builder: ConfigBuilder<DefaultState>,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        builder.add_source(env).build()?.try_deserialize()
    }
}

/// `APP__SECTION__KEY` variables, e.g. `APP__AUTH__SECRET`
fn environment() -> config::Environment {
    config::Environment::with_prefix("APP")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("session.fingerprint_headers")
        .try_parsing(true)
}
