//! Account registration and login web service
//!
//! Users register and log in through HTML forms; identity is kept in a
//! signed session cookie and accounts live in a PostgreSQL `users` table.

pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod templates;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use service::AuthService;
pub use state::AppState;
