//! Team domain module

mod entity;
mod repository;
mod validation;

pub use entity::{NewTeam, Team, TeamId};
pub use repository::TeamRepository;
pub use validation::{validate_team_code, validate_team_name, TeamValidationError};

#[cfg(test)]
pub use repository::MockTeamRepository;
