use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors from store settings, loyalty, feedback, notifications and uploads.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store validation error: {0}")]
    ValidationError(String),
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for StoreError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => StoreError::NotFound(id),
            FrameworkError::Rejected(reason) => StoreError::ValidationError(reason),
            FrameworkError::Conflict { key, .. } => StoreError::AlreadyExists(key),
            other => StoreError::ActorCommunicationError(other.to_string()),
        }
    }
}
