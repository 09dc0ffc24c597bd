//! Custom error types for the common library
//!
//! This module defines the database error taxonomy shared by the services.
//! Raw `sqlx` errors are classified once, in the `From` impl below, so callers
//! can match on pool exhaustion or constraint violations without inspecting
//! driver internals.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while establishing or reaching a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Every pooled connection stayed leased past the acquire timeout
    #[error("Database pool exhausted: no connection available")]
    PoolExhausted,

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Whether the error was caused by a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::PoolTimedOut => DatabaseError::PoolExhausted,
            SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
                DatabaseError::Connection(err)
            }
            SqlxError::Configuration(e) => DatabaseError::Configuration(e.to_string()),
            SqlxError::Database(ref db_err) if db_err.is_unique_violation() => {
                let constraint = db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string());
                DatabaseError::UniqueViolation(constraint)
            }
            other => DatabaseError::Query(other),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_maps_to_exhausted() {
        let err = DatabaseError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, DatabaseError::PoolExhausted));
    }

    #[test]
    fn closed_pool_is_a_connection_error() {
        let err = DatabaseError::from(SqlxError::PoolClosed);
        assert!(matches!(err, DatabaseError::Connection(_)));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn missing_row_is_a_query_error() {
        let err = DatabaseError::from(SqlxError::RowNotFound);
        assert!(matches!(err, DatabaseError::Query(_)));
    }
}
