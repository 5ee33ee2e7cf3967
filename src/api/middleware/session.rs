//! Session extractors
//!
//! The session token is read from `Authorization: Bearer <token>` or, when
//! absent, from the `access_token` cookie set at login.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::{Session, SessionClaims};

/// Cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the anti-forgery token
pub const CSRF_TOKEN_COOKIE: &str = "csrf_token";

/// Extractor for read-only endpoints: valid token and matching fingerprint
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

/// Extractor for state-changing endpoints: additionally requires the CSRF header
#[derive(Debug, Clone)]
pub struct RequireCsrfSession(pub Session);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = validated_claims(&parts.headers, state)?;
        let session = state.session_guard.authorize(&claims, &parts.headers)?;

        Ok(RequireSession(session))
    }
}

impl FromRequestParts<AppState> for RequireCsrfSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = validated_claims(&parts.headers, state)?;
        let session = state
            .session_guard
            .authorize_mutation(&claims, &parts.headers)?;

        Ok(RequireCsrfSession(session))
    }
}

fn validated_claims(headers: &HeaderMap, state: &AppState) -> Result<SessionClaims, ApiError> {
    let token = extract_session_token(headers).ok_or_else(|| {
        ApiError::unauthorized(
            "Authentication required. Provide a session token via 'Authorization: Bearer <token>' or the access_token cookie",
        )
    })?;

    debug!("Validating session token");

    state
        .jwt_service
        .validate(&token)
        .map_err(ApiError::from)
}

/// Extract the session token from the Authorization header or cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers).or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Read a cookie value by name from all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
