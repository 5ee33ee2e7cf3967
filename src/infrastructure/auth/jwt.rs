//! JWT session token issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;

use super::session::SessionBinding;
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    /// SHA-256 digest of the anti-forgery token issued with this session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
    /// Client fingerprint captured at login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fgp: Option<String>,
}

impl SessionClaims {
    /// Create unbound claims for a subject valid for `ttl`
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            csrf: None,
            fgp: None,
        }
    }

    /// Attach the anti-forgery digest and fingerprint of a login
    pub fn bound_to(mut self, binding: &SessionBinding) -> Self {
        self.csrf = Some(binding.csrf_digest());
        self.fgp = Some(binding.fingerprint().as_str().to_string());
        self
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }
}

/// Configuration for the JWT service
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret used for signing
    pub secret: String,
    /// Signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Default session lifetime in minutes
    pub expiration_minutes: u64,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

impl JwtConfig {
    /// Create new JWT configuration using HS256
    pub fn new(secret: impl Into<String>, expiration_minutes: u64) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            expiration_minutes,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build configuration from externally supplied settings
    pub fn from_settings(
        secret: &str,
        algorithm: &str,
        expiration_minutes: u64,
    ) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("JWT secret cannot be empty"));
        }

        if expiration_minutes == 0 {
            return Err(DomainError::configuration(
                "Token expiration must be at least one minute",
            ));
        }

        let algorithm = parse_algorithm(algorithm)?;

        Ok(Self::new(secret, expiration_minutes).with_algorithm(algorithm))
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.expiration_minutes as i64)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new("changeme123", 60)
    }
}

/// Parse an HMAC algorithm name
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    let algorithm = Algorithm::from_str(&name.to_ascii_uppercase())
        .map_err(|_| DomainError::configuration(format!("Unknown JWT algorithm: {}", name)))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(DomainError::configuration(format!(
            "Unsupported JWT algorithm: {:?}. Use HS256, HS384 or HS512.",
            other
        ))),
    }
}

/// Issues and validates signed session tokens
pub trait TokenIssuer: Send + Sync + Debug {
    /// Sign arbitrary claims
    fn issue_claims(&self, claims: &SessionClaims) -> Result<String, DomainError>;

    /// Validate a token and return its claims
    fn validate(&self, token: &str) -> Result<SessionClaims, DomainError>;

    /// Lifetime used for sessions issued at login
    fn default_ttl(&self) -> Duration;

    /// Issue an unbound token for `subject` valid for `ttl`
    fn issue(&self, subject: &str, ttl: Duration) -> Result<String, DomainError> {
        self.issue_claims(&SessionClaims::new(subject, ttl))
    }

    /// Issue a token carrying the login's anti-forgery digest and fingerprint
    fn issue_bound(
        &self,
        subject: &str,
        ttl: Duration,
        binding: &SessionBinding,
    ) -> Result<String, DomainError> {
        self.issue_claims(&SessionClaims::new(subject, ttl).bound_to(binding))
    }
}

/// JWT service implementation using a shared secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtService {
    fn issue_claims(&self, claims: &SessionClaims) -> Result<String, DomainError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, DomainError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| DomainError::invalid_token(e.to_string()))?;

        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(DomainError::invalid_token("Token has no subject"));
        }

        if claims.is_expired() {
            return Err(DomainError::invalid_token("Token has expired"));
        }

        Ok(claims)
    }

    fn default_ttl(&self) -> Duration {
        self.config.ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::session::{Fingerprint, SessionBinding};

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret-key-12345", 60))
    }

    fn assert_invalid_token(result: Result<SessionClaims, DomainError>) {
        assert!(
            matches!(result, Err(DomainError::InvalidToken { .. })),
            "expected InvalidToken, got {:?}",
            result
        );
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_service();

        let token = service.issue("user1", Duration::minutes(60)).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.subject(), "user1");
        assert!(claims.exp > claims.iat);
        assert!(claims.csrf.is_none());
        assert!(claims.fgp.is_none());
    }

    #[test]
    fn test_issue_bound_carries_binding() {
        let service = create_service();
        let binding = SessionBinding::new("csrf-value", Fingerprint::from_raw("fp"));

        let token = service
            .issue_bound("user1", service.default_ttl(), &binding)
            .unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.csrf, Some(binding.csrf_digest()));
        assert_eq!(claims.fgp.as_deref(), Some("fp"));
        assert_ne!(claims.csrf.as_deref(), Some("csrf-value"));
    }

    #[test]
    fn test_garbage_token() {
        let service = create_service();

        assert_invalid_token(service.validate("invalid-token"));
        assert_invalid_token(service.validate(""));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret-1", 60));
        let service2 = JwtService::new(JwtConfig::new("secret-2", 60));

        let token = service1.issue("user1", Duration::minutes(5)).unwrap();

        assert_invalid_token(service2.validate(&token));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = JwtService::new(
            JwtConfig::new("shared-secret", 60).with_algorithm(Algorithm::HS512),
        );
        let hs256 = JwtService::new(JwtConfig::new("shared-secret", 60));

        let token = hs512.issue("user1", Duration::minutes(5)).unwrap();

        assert_invalid_token(hs256.validate(&token));
    }

    #[test]
    fn test_expired_token() {
        let service = create_service();

        let token = service.issue("user1", Duration::seconds(-5)).unwrap();

        assert_invalid_token(service.validate(&token));
    }

    #[test]
    fn test_missing_subject() {
        let service = create_service();

        let token = service.issue("", Duration::minutes(5)).unwrap();
        assert_invalid_token(service.validate(&token));

        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }

        let token = encode(
            &Header::default(),
            &NoSubject {
                exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            },
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();
        assert_invalid_token(service.validate(&token));
    }

    #[tokio::test]
    async fn test_token_expires_after_ttl() {
        let service = create_service();

        let token = service.issue("user1", Duration::seconds(1)).unwrap();
        assert!(service.validate(&token).is_ok());

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

        assert_invalid_token(service.validate(&token));
    }

    #[test]
    fn test_config_from_settings() {
        let config = JwtConfig::from_settings("secret", "hs384", 30).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS384);
        assert_eq!(config.ttl(), Duration::minutes(30));

        assert!(matches!(
            JwtConfig::from_settings("", "HS256", 60),
            Err(DomainError::Configuration { .. })
        ));
        assert!(matches!(
            JwtConfig::from_settings("secret", "RS256", 60),
            Err(DomainError::Configuration { .. })
        ));
        assert!(matches!(
            JwtConfig::from_settings("secret", "none", 60),
            Err(DomainError::Configuration { .. })
        ));
        assert!(matches!(
            JwtConfig::from_settings("secret", "HS256", 0),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_config_debug_hides_secret() {
        let config = JwtConfig::new("super-secret", 60);
        let debug = format!("{:?}", config);

        assert!(!debug.contains("super-secret"));
    }
}
