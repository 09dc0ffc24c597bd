//! Custom error types for the authentication service

use common::DatabaseError;
use thiserror::Error;

/// Failure of a registration or login attempt
#[derive(Error, Debug)]
pub enum AuthError {
    /// Submitted form failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Another account already owns the username
    #[error("Username already taken")]
    UsernameTaken,

    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Insert or commit of a new user failed and was rolled back
    #[error("Registration failed: {0}")]
    RegistrationFailed(#[source] DatabaseError),

    /// No pooled connection became free in time
    #[error("Database pool exhausted")]
    PoolExhausted,

    /// Database failure outside of the registration write
    #[error("Database error: {0}")]
    Database(#[source] DatabaseError),

    /// Hashing or task failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Message shown to the user as a flash
    ///
    /// Never reveals whether a username exists on the login path.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::UsernameTaken => "Username already exists".to_string(),
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::RegistrationFailed(_) => "Error occurred during registration".to_string(),
            AuthError::PoolExhausted => "Server is busy, please try again shortly".to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                "An unexpected error occurred, please try again".to_string()
            }
        }
    }
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::PoolExhausted => AuthError::PoolExhausted,
            other => AuthError::Database(other),
        }
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
