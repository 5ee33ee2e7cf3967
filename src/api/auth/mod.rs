//! Authentication API endpoints
//!
//! Registration, login and logout. Login hands the session token out both in
//! the response body and as an `HttpOnly` cookie, next to a script-readable
//! `csrf_token` cookie whose value must be echoed in `X-CSRF-Token`.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::middleware::{ACCESS_TOKEN_COOKIE, CSRF_TOKEN_COOKIE};
use crate::api::state::{AppState, CookieSettings};
use crate::api::types::{ApiError, Form, Json};
use crate::domain::User;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().value(),
            username: user.username().to_string(),
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Register a new user
///
/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .auth_service
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Login with username and password
///
/// POST /login (form encoded)
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<LoginRequest>,
) -> Result<Response, ApiError> {
    let binding = state.session_guard.bind(&headers);

    let access = state
        .auth_service
        .authenticate(&request.username, &request.password, &binding)
        .await?;

    let max_age = access.max_age_seconds();
    let cookies = [
        session_cookie(&state.cookies, ACCESS_TOKEN_COOKIE, &access.token, max_age, true),
        session_cookie(&state.cookies, CSRF_TOKEN_COOKIE, binding.csrf_token(), max_age, false),
    ];

    let mut response_headers = HeaderMap::new();
    for cookie in cookies {
        let cookie = cookie.map_err(|e| {
            error!(error = %e, "Failed to build session cookie");
            ApiError::internal()
        })?;
        response_headers.append(SET_COOKIE, cookie);
    }

    let body = TokenResponse {
        access_token: access.token,
        token_type: "bearer",
    };

    Ok((response_headers, Json(body)).into_response())
}

/// Logout by expiring both session cookies
///
/// POST /logout
///
/// Tokens are stateless, so a copied bearer token stays valid until it
/// expires. This only clears the browser's cookies.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response_headers = HeaderMap::new();

    for (name, http_only) in [(ACCESS_TOKEN_COOKIE, true), (CSRF_TOKEN_COOKIE, false)] {
        if let Ok(cookie) = session_cookie(&state.cookies, name, "", 0, http_only) {
            response_headers.append(SET_COOKIE, cookie);
        }
    }

    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build a `SameSite=Strict` session cookie; `max_age` 0 expires it
fn session_cookie(
    settings: &CookieSettings,
    name: &str,
    value: &str,
    max_age: i64,
    http_only: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; SameSite=Strict; Max-Age={max_age}");

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    if settings.secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
}
