//! Common library for the account services
//!
//! This crate provides shared functionality used by the services, namely
//! PostgreSQL connectivity, schema bootstrap and the database error taxonomy.
//!
//! ```rust,no_run
//! use common::database::{Database, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let database = Database::connect(&config).await?;
//!     database.init_db().await?;
//!     println!("Database health check: {}", database.health_check().await?);
//!     database.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;

pub use database::{Database, DatabaseConfig};
pub use error::{DatabaseError, DatabaseResult};
