use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during sign-in and staff-account management.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not allowed: {0}")]
    Forbidden(String),
    #[error("Account validation error: {0}")]
    ValidationError(String),
    #[error("Account already exists: {0}")]
    AlreadyExists(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for AccountError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => AccountError::NotFound(id),
            FrameworkError::Rejected(reason) => AccountError::ValidationError(reason),
            FrameworkError::Conflict { key, .. } => AccountError::AlreadyExists(key),
            other => AccountError::ActorCommunicationError(other.to_string()),
        }
    }
}
