//! In-process user store
//!
//! Mirrors the `users` table semantics (serial ids, unique usernames) without
//! a database. Used by the test suites and handy for local experiments.

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::UserStore;
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<User>,
    last_id: i32,
}

/// User store holding rows in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<Mutex<Table>>,
}

impl InMemoryUserRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn count(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// Number of rows with the given username
    pub async fn count_username(&self, username: &str) -> usize {
        self.table
            .lock()
            .await
            .rows
            .iter()
            .filter(|user| user.username == username)
            .count()
    }
}

#[async_trait]
impl UserStore for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut table = self.table.lock().await;

        if table
            .rows
            .iter()
            .any(|user| user.username == new_user.username)
        {
            return Err(DatabaseError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
        };
        table.rows.push(user.clone());

        Ok(user)
    }
}
