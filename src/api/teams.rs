//! Team endpoints
//!
//! JSON responses carry stored text verbatim. The HTML view escapes every
//! user-supplied field before it reaches the page.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{RequireCsrfSession, RequireSession};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::Team;

/// Create the teams router
pub fn create_teams_router() -> Router<AppState> {
    Router::new().route("/teams", get(list_teams).post(create_team))
}

/// Create team request
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// Team response
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            id: team.id().value(),
            code: team.code().to_string(),
            name: team.name().to_string(),
        }
    }
}

/// Create a team
///
/// POST /teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireCsrfSession(session): RequireCsrfSession,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = state
        .team_service
        .create_team(&session, &request.code, &request.name)
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

/// List teams as JSON, or as an HTML table when the client prefers HTML
///
/// GET /teams
pub async fn list_teams(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let teams = state.team_service.list_teams(&session).await?;

    if prefers_html(&headers) {
        return Ok(Html(render_teams_html(&teams)).into_response());
    }

    let body: Vec<TeamResponse> = teams.into_iter().map(TeamResponse::from).collect();
    Ok(Json(body).into_response())
}

/// Whether `Accept` ranks `text/html` above `application/json`
fn prefers_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mut html = 0.0_f32;
    let mut json = 0.0_f32;

    for range in accept.split(',') {
        let mut params = range.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let quality = params
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        match media_type.as_str() {
            "text/html" => html = html.max(quality),
            "application/json" => json = json.max(quality),
            _ => {}
        }
    }

    html > 0.0 && html >= json
}

fn render_teams_html(teams: &[Team]) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Teams</title></head>\n<body>\n\
         <table>\n<thead><tr><th>ID</th><th>Code</th><th>Name</th></tr></thead>\n<tbody>\n",
    );

    for team in teams {
        page.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            team.id(),
            escape_html(team.code()),
            escape_html(team.name())
        ));
    }

    page.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    page
}

/// Escape text for inclusion in HTML element content or quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
