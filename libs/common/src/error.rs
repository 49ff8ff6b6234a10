//! Custom error types for the common library
//!
//! This module defines the error types returned by the relational-store
//! plumbing, plus helpers for classifying driver errors.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Returns true when the error is a UNIQUE or PRIMARY KEY constraint failure.
pub fn is_unique_violation(err: &SqlxError) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}

/// Returns true when the error is a FOREIGN KEY constraint failure.
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    err.as_database_error()
        .map(|e| e.is_foreign_key_violation())
        .unwrap_or(false)
}
