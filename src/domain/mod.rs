//! Domain layer - Core business logic and entities

pub mod error;
pub mod team;
pub mod user;

pub use error::DomainError;
pub use team::{NewTeam, Team, TeamId, TeamRepository};
pub use user::{NewUser, User, UserId, UserRepository};
