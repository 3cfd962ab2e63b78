//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID must start with a letter or number")]
    InvalidIdStart,

    #[error("User ID must end with a letter or number")]
    InvalidIdEnd,

    #[error("User ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidIdCharacter(char),

    #[error("User ID cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Name must be at least {0} characters")]
    NameTooShort(usize),

    #[error("Name is too long. Maximum length is {0} characters")]
    NameTooLong(usize),

    #[error("Email is required")]
    EmptyEmail,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Password needs at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password needs at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password needs at least one number")]
    PasswordMissingDigit,

    #[error("Password needs at least one special character")]
    PasswordMissingSpecial,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl UserValidationError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId
            | Self::IdTooLong(_)
            | Self::InvalidIdStart
            | Self::InvalidIdEnd
            | Self::InvalidIdCharacter(_)
            | Self::ConsecutiveHyphens => "id",
            Self::NameTooShort(_) | Self::NameTooLong(_) => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::PasswordMismatch => "confirmPassword",
            _ => "password",
        }
    }
}

const MAX_USER_ID_LENGTH: usize = 50;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Validate a user ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 50 characters
/// - Only alphanumeric characters and hyphens
/// - Must start and end with alphanumeric
/// - No consecutive hyphens
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    let chars: Vec<char> = id.chars().collect();

    if !chars[0].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdStart);
    }

    if !chars[chars.len() - 1].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdEnd);
    }

    let mut prev_hyphen = false;

    for c in &chars {
        if *c == '-' {
            if prev_hyphen {
                return Err(UserValidationError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            prev_hyphen = false;
        } else {
            return Err(UserValidationError::InvalidIdCharacter(*c));
        }
    }

    Ok(())
}

/// Validate a display name (2 to 50 characters)
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    let length = name.chars().count();

    if length < MIN_NAME_LENGTH {
        return Err(UserValidationError::NameTooShort(MIN_NAME_LENGTH));
    }

    if length > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate password strength
///
/// Rules:
/// - 8 to 128 characters
/// - At least one uppercase letter, one lowercase letter and one digit
/// - At least one character that is not a letter or digit
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(UserValidationError::PasswordMissingUppercase);
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(UserValidationError::PasswordMissingLowercase);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserValidationError::PasswordMissingDigit);
    }

    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(UserValidationError::PasswordMissingSpecial);
    }

    Ok(())
}

/// Check that the confirmation matches the password
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), UserValidationError> {
    if password != confirmation {
        return Err(UserValidationError::PasswordMismatch);
    }

    Ok(())
}
