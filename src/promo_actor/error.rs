use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::cart::CartError;
use crate::domain::PromoRejection;

/// Errors that can occur during promo code and promotion operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PromoError {
    #[error("Promo code not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(#[from] PromoRejection),
    #[error("Promo validation error: {0}")]
    ValidationError(String),
    #[error("Promo code already exists: {0}")]
    AlreadyExists(String),
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for PromoError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => PromoError::NotFound(id),
            FrameworkError::Rejected(reason) => PromoError::ValidationError(reason),
            FrameworkError::Conflict { key, .. } => PromoError::AlreadyExists(key),
            other => PromoError::ActorCommunicationError(other.to_string()),
        }
    }
}
