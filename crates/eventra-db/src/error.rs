//! Database-specific error types and conversions.

use eventra_core::error::EventraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored data: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for EventraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EventraError::NotFound { entity, id },
            other => EventraError::Database(other.to_string()),
        }
    }
}
