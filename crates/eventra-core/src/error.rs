//! Error types for the Eventra system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    #[error("Unrecognized role value: {value}")]
    UnknownRole { value: String },

    #[error("Invalid workflow transition: cannot {attempted} a milestone in state {from}")]
    InvalidTransition { from: String, attempted: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EventraResult<T> = Result<T, EventraError>;
