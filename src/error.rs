use thiserror::Error;

use crate::cart::CartError;
use crate::order_actor::OrderError;

/// Errors surfaced by order submission. Promo lookups, notifications and usage
/// bookkeeping never end up here; they are logged and the order goes through.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(String),
    #[error("An order for table {0} is already being submitted")]
    SubmissionInProgress(String),
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
    #[error("{0}")]
    Placement(#[from] OrderError),
}
