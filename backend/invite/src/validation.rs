use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MAX_WELL_WISHES_CHARS, RsvpSubmission, payloads::FieldMessage};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    WellWishes,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Name is required")]
    MissingName,

    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Well wishes must be at most {max} characters (got {len})")]
    WellWishesTooLong { len: usize, max: usize },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::MissingName => Field::Name,
            FieldError::MissingEmail | FieldError::InvalidEmail => Field::Email,
            FieldError::WellWishesTooLong { .. } => Field::WellWishes,
        }
    }
}

/// Every field problem found in one submission, in form order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn messages(&self) -> Vec<FieldMessage> {
        self.0
            .iter()
            .map(|e| FieldMessage {
                field: e.field(),
                message: e.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// Checks a submission the same way on both sides of the wire.
///
/// `attending` is already one of yes/no by type. Well wishes are only
/// measured when declining since that is the only branch that keeps them.
pub fn validate_submission(submission: &RsvpSubmission) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if submission.name.trim().is_empty() {
        errors.push(FieldError::MissingName);
    }

    let email = submission.email.trim();
    if email.is_empty() {
        errors.push(FieldError::MissingEmail);
    } else if !is_valid_email(email) {
        errors.push(FieldError::InvalidEmail);
    }

    if submission.attending == crate::Attending::No {
        if let Some(wishes) = &submission.well_wishes {
            let len = wishes.trim().chars().count();
            if len > MAX_WELL_WISHES_CHARS {
                errors.push(FieldError::WellWishesTooLong {
                    len,
                    max: MAX_WELL_WISHES_CHARS,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attending;

    fn valid() -> RsvpSubmission {
        RsvpSubmission {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            attending: Attending::Yes,
            ..Default::default()
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email(" jane.doe+rsvp@mail.example.org "));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("jane.x.com"));
        assert!(!is_valid_email("jane doe@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_valid_submission() {
        assert_eq!(validate_submission(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let bad = RsvpSubmission {
            name: "  ".to_string(),
            email: "nope".to_string(),
            ..valid()
        };

        let errors = validate_submission(&bad).unwrap_err();
        assert_eq!(errors.0, vec![FieldError::MissingName, FieldError::InvalidEmail]);
        assert_eq!(errors.for_field(Field::Email), Some(&FieldError::InvalidEmail));
        assert_eq!(errors.for_field(Field::Name), Some(&FieldError::MissingName));
        assert_eq!(errors.for_field(Field::WellWishes), None);
    }

    #[test]
    fn test_missing_email() {
        let bad = RsvpSubmission {
            email: String::new(),
            ..valid()
        };

        let errors = validate_submission(&bad).unwrap_err();
        assert_eq!(errors.0, vec![FieldError::MissingEmail]);
    }

    #[test]
    fn test_well_wishes_limit() {
        let at_limit = RsvpSubmission {
            attending: Attending::No,
            well_wishes: Some("x".repeat(400)),
            ..valid()
        };
        assert_eq!(validate_submission(&at_limit), Ok(()));

        let over = RsvpSubmission {
            well_wishes: Some("x".repeat(401)),
            ..at_limit.clone()
        };
        let errors = validate_submission(&over).unwrap_err();
        assert_eq!(
            errors.0,
            vec![FieldError::WellWishesTooLong { len: 401, max: 400 }]
        );
    }

    #[test]
    fn test_well_wishes_ignored_when_attending() {
        let attending = RsvpSubmission {
            well_wishes: Some("x".repeat(1000)),
            ..valid()
        };

        assert_eq!(validate_submission(&attending), Ok(()));
    }

    #[test]
    fn test_messages() {
        let errors = ValidationErrors(vec![FieldError::InvalidEmail]);
        let messages = errors.messages();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].field, Field::Email);
        assert_eq!(messages[0].message, "Invalid email format");
        assert_eq!(errors.to_string(), "Invalid email format");
    }
}
