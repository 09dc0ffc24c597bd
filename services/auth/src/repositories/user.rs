//! User repository for database operations

use async_trait::async_trait;
use common::{Database, DatabaseError, DatabaseResult};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::models::{NewUser, User};

/// Storage seam used by the registration and login flows
///
/// Implementations must enforce username uniqueness themselves and report a
/// duplicate as [`DatabaseError::UniqueViolation`]; callers treat that as the
/// authoritative "username taken" signal.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Insert a user atomically, committing on success and leaving no row on failure
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    database: Database,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let mut conn = self.database.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        self.database.release(conn);

        Ok(user)
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut tx = self.database.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed insert also failed: {}", rollback_err);
                }
                return Err(DatabaseError::from(e));
            }
        };

        tx.commit().await?;

        let user = User {
            id: row.get("id"),
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
        };

        info!("Created user {} with id {}", user.username, user.id);
        Ok(user)
    }
}
