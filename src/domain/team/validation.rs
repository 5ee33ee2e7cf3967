//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team code cannot be empty")]
    EmptyCode,

    #[error("Team code cannot exceed {0} characters")]
    CodeTooLong(usize),

    #[error("Team code cannot contain control characters")]
    CodeControlCharacter,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team name cannot contain control characters")]
    NameControlCharacter,
}

const MAX_TEAM_CODE_LENGTH: usize = 50;
const MAX_TEAM_NAME_LENGTH: usize = 100;

/// Validate a team code
///
/// Any printable text is accepted; markup is escaped at render time,
/// not rejected here.
pub fn validate_team_code(code: &str) -> Result<(), TeamValidationError> {
    if code.trim().is_empty() {
        return Err(TeamValidationError::EmptyCode);
    }

    if code.chars().count() > MAX_TEAM_CODE_LENGTH {
        return Err(TeamValidationError::CodeTooLong(MAX_TEAM_CODE_LENGTH));
    }

    if code.chars().any(char::is_control) {
        return Err(TeamValidationError::CodeControlCharacter);
    }

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    if name.chars().any(char::is_control) {
        return Err(TeamValidationError::NameControlCharacter);
    }

    Ok(())
}
