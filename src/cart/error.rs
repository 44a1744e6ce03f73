use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Table number is required")]
    MissingTable,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
