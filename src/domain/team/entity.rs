//! Team entity and related types

use serde::{Deserialize, Serialize};

/// Store-assigned team identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A team that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub code: String,
    pub name: String,
}

impl NewTeam {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Team entity
///
/// `code` and `name` hold exactly what the client sent; escaping happens
/// only when rendering into HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    code: String,
    name: String,
}

impl Team {
    pub fn new(id: TeamId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn from_new(id: TeamId, new_team: NewTeam) -> Self {
        Self::new(id, new_team.code, new_team.name)
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
