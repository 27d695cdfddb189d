//! Checks applied to user input before any request is built.
//!
//! A failed check is a local failure: nothing is sent to the server.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{Credentials, GenerationJob, Registration};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Please enter your email address")]
    MissingEmail,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please select an image of your room")]
    MissingImage,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(EMAIL_PATTERN))
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationError> {
    let any_blank = [
        registration.first_name.as_str(),
        registration.last_name.as_str(),
        registration.email.as_str(),
    ]
    .iter()
    .any(|field| field.trim().is_empty());

    if any_blank || registration.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Confirmation is a form concern, so it is checked separately from
/// `validate_registration`.
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_reset_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_generation_job(job: &GenerationJob) -> Result<(), ValidationError> {
    if job.image.is_empty() {
        return Err(ValidationError::MissingImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DesignStyle;

    fn registration(password: &str) -> Registration {
        Registration {
            email: "a@b.com".to_string(),
            password: password.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b")); // no dot in domain
        assert!(!is_valid_email("a b@c.com")); // whitespace
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let ok = Credentials::new("a@b.com", "secret1");
        assert_eq!(validate_credentials(&ok), Ok(()));

        let no_password = Credentials::new("a@b.com", "");
        assert_eq!(validate_credentials(&no_password), Err(ValidationError::MissingFields));

        let blank_email = Credentials::new("   ", "secret1");
        assert_eq!(validate_credentials(&blank_email), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_registration_rules() {
        assert_eq!(validate_registration(&registration("secret1")), Ok(()));
        assert_eq!(
            validate_registration(&registration("12345")),
            Err(ValidationError::PasswordTooShort)
        );

        let mut missing_name = registration("secret1");
        missing_name.last_name.clear();
        assert_eq!(validate_registration(&missing_name), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_password_confirmation() {
        assert_eq!(validate_password_confirmation("secret1", "secret1"), Ok(()));
        assert_eq!(
            validate_password_confirmation("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_reset_email() {
        assert_eq!(validate_reset_email(""), Err(ValidationError::MissingEmail));
        assert_eq!(validate_reset_email("nope"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_reset_email(" a@b.com "), Ok(()));
    }

    #[test]
    fn test_generation_job_needs_image() {
        let job = GenerationJob {
            image: Vec::new(),
            prompt: "cosy".to_string(),
            room_type: "bedroom".to_string(),
            style: DesignStyle::Bohemian,
        };
        assert_eq!(validate_generation_job(&job), Err(ValidationError::MissingImage));
    }
}
