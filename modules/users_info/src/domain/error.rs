use thiserror::Error;
use uuid::Uuid;

use crate::domain::validation::{ValidationFailure, Violation};

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Validation {
        message: String,
        violations: Vec<Violation>,
    },

    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("User not found with email '{email}'")]
    UserNotFoundByEmail { email: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn user_not_found_by_email(email: impl Into<String>) -> Self {
        Self::UserNotFoundByEmail {
            email: email.into(),
        }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

impl From<ValidationFailure> for DomainError {
    fn from(failure: ValidationFailure) -> Self {
        let (message, violations) = failure.into_parts();
        Self::Validation {
            message,
            violations,
        }
    }
}
