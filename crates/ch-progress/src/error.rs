//! Engine error types

use ch_core::error::ValidationErrors;
use ch_db::RepositoryError;
use thiserror::Error;

/// Error type for progress engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        EngineError::NotFound(format!("{} with id {}", entity, id))
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => EngineError::NotFound(msg),
            other => EngineError::Database(other.to_string()),
        }
    }
}

/// Result type for progress engine operations
pub type EngineResult<T> = Result<T, EngineError>;
