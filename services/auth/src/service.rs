//! Registration and login flows
//!
//! Both flows talk to storage only through [`UserStore`], so each step leases
//! a pooled connection for exactly one operation and hands it back before the
//! next step runs. Argon2 work happens on the blocking pool.

use common::DatabaseError;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{NewUser, SessionIdentity, User},
    password,
    repositories::UserStore,
    validation::{validate_password, validate_username},
};

/// Account operations shared by the route handlers
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Create a new authentication service over a user store
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new account
    ///
    /// The lookup before the insert is only a fast path: two concurrent
    /// registrations can both pass it, and the loser is caught by the unique
    /// constraint and reported as [`AuthError::UsernameTaken`] as well.
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<User> {
        validate_username(username).map_err(AuthError::Validation)?;
        validate_password(password).map_err(AuthError::Validation)?;

        if self.users.find_by_username(username).await?.is_some() {
            warn!("Registration rejected, username taken: {}", username);
            return Err(AuthError::UsernameTaken);
        }

        let plaintext = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let new_user = NewUser {
            username: username.to_owned(),
            password_hash,
        };

        match self.users.insert(&new_user).await {
            Ok(user) => {
                info!("Registered user {} (id {})", user.username, user.id);
                Ok(user)
            }
            Err(e) if e.is_unique_violation() => {
                warn!(
                    "Registration for {} lost a race on the unique constraint",
                    username
                );
                Err(AuthError::UsernameTaken)
            }
            Err(DatabaseError::PoolExhausted) => Err(AuthError::PoolExhausted),
            Err(e) => {
                error!("Failed to register user {}: {}", username, e);
                Err(AuthError::RegistrationFailed(e))
            }
        }
    }

    /// Check credentials and return the identity to store in the session
    ///
    /// Unknown usernames and wrong passwords fail identically, including the
    /// time spent verifying.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<SessionIdentity> {
        let user = self.users.find_by_username(username).await?;

        let plaintext = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || match user {
            Some(user) => password::verify_password(&user.password_hash, &plaintext)
                .map(|ok| ok.then_some(user)),
            None => {
                password::verify_dummy(&plaintext);
                Ok(None)
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))?
        .map_err(|e| {
            error!("Stored hash for {} is unusable: {}", username, e);
            AuthError::Internal(e.to_string())
        })?;

        match verified {
            Some(user) => {
                info!("User {} logged in", user.username);
                Ok(SessionIdentity::from(&user))
            }
            None => {
                warn!("Failed login attempt for user: {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;
    use async_trait::async_trait;
    use common::DatabaseResult;

    fn service() -> (AuthService, InMemoryUserRepository) {
        let store = InMemoryUserRepository::new();
        (AuthService::new(Arc::new(store.clone())), store)
    }

    /// Misses every lookup, then fails the insert with the given error
    struct RacingStore {
        insert_error: fn() -> DatabaseError,
    }

    #[async_trait]
    impl UserStore for RacingStore {
        async fn find_by_username(&self, _username: &str) -> DatabaseResult<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, _new_user: &NewUser) -> DatabaseResult<User> {
            Err((self.insert_error)())
        }
    }

    #[tokio::test]
    async fn register_stores_one_hashed_row() {
        let (service, store) = service();

        let user = service.register("alice", "secret1").await.unwrap();

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "secret1");
        assert_eq!(store.count_username("alice").await, 1);

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let (service, store) = service();
        service.register("alice", "secret1").await.unwrap();

        let err = service.register("alice", "other").await.unwrap_err();

        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let (service, store) = service();

        assert!(matches!(
            service.register("", "secret1").await.unwrap_err(),
            AuthError::Validation(_)
        ));
        assert!(matches!(
            service.register("alice", "").await.unwrap_err(),
            AuthError::Validation(_)
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn unique_violation_on_insert_means_taken() {
        let service = AuthService::new(Arc::new(RacingStore {
            insert_error: || DatabaseError::UniqueViolation("users_username_key".to_string()),
        }));

        let err = service.register("alice", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn other_insert_failures_are_registration_failed() {
        let service = AuthService::new(Arc::new(RacingStore {
            insert_error: || DatabaseError::Configuration("disk full".to_string()),
        }));

        let err = service.register("alice", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::RegistrationFailed(_)));
        assert_eq!(err.user_message(), "Error occurred during registration");
    }

    #[tokio::test]
    async fn exhausted_pool_on_insert_is_reported() {
        let service = AuthService::new(Arc::new(RacingStore {
            insert_error: || DatabaseError::PoolExhausted,
        }));

        let err = service.register("alice", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::PoolExhausted));
    }

    #[tokio::test]
    async fn login_returns_identity_for_correct_password() {
        let (service, _) = service();
        let user = service.register("alice", "secret1").await.unwrap();

        let identity = service.login("alice", "secret1").await.unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_the_same_way() {
        let (service, _) = service();
        service.register("alice", "secret1").await.unwrap();

        let wrong = service.login("alice", "wrong").await.unwrap_err();
        let unknown = service.login("bob", "secret1").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.user_message(), unknown.user_message());
    }
}
