//! User model and related functionality

use serde::Deserialize;
use sqlx::FromRow;

/// User entity, one row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string, never the plaintext
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Username/password pair posted by the register and login forms
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
