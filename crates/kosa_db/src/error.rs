//! Error types for the database layer

use kosa_common::KosaError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A unique constraint rejected the write
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    /// A stored value could not be turned back into a model
    #[error("Failed to decode column {column}: {message}")]
    Decode { column: String, message: String },
}

impl DbError {
    /// Maps a query failure, singling out unique-constraint violations.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
        }
        DbError::QueryError(err.to_string())
    }

    pub(crate) fn decode(column: &str, message: impl ToString) -> Self {
        DbError::Decode {
            column: column.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<DbError> for KosaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => KosaError::ConflictError(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => KosaError::ConfigError(msg),
            other => KosaError::DatabaseError(other.to_string()),
        }
    }
}
