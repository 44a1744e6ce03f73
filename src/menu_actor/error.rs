use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::store_actor::StoreError;

/// Errors that can occur while managing or browsing the menu.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Menu entry not found: {0}")]
    NotFound(String),
    #[error("Menu validation error: {0}")]
    ValidationError(String),
    #[error("Menu entry already exists: {0}")]
    AlreadyExists(String),
    #[error("Image upload failed: {0}")]
    Storage(#[from] StoreError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for MenuError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => MenuError::NotFound(id),
            FrameworkError::Rejected(reason) => MenuError::ValidationError(reason),
            FrameworkError::Conflict { key, .. } => MenuError::AlreadyExists(key),
            other => MenuError::ActorCommunicationError(other.to_string()),
        }
    }
}
