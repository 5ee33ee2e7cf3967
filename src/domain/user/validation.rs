//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, dots, underscores, and hyphens are allowed")]
    InvalidUsernameCharacter(char),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a username
///
/// Rules:
/// - Cannot be empty
/// - Maximum 50 characters
/// - Only ASCII alphanumeric characters, dots, underscores, and hyphens
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' && c != '.' {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }
    }

    Ok(())
}

/// Validate a plaintext password before hashing
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("user1").is_ok());
        assert!(validate_username("a").is_ok());
        assert!(validate_username("john.doe").is_ok());
        assert!(validate_username("john_doe-2").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(
            validate_username(""),
            Err(UserValidationError::EmptyUsername)
        );
        assert_eq!(
            validate_username("bad user"),
            Err(UserValidationError::InvalidUsernameCharacter(' '))
        );
        assert_eq!(
            validate_username("<script>"),
            Err(UserValidationError::InvalidUsernameCharacter('<'))
        );
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(UserValidationError::UsernameTooLong(50))
        );
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("pass").is_ok());
        assert_eq!(validate_password(""), Err(UserValidationError::EmptyPassword));
        assert_eq!(
            validate_password(&"x".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }
}
