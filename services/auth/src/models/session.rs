//! Session model and related functionality

use serde::{Deserialize, Serialize};

use super::User;

/// Identity kept in the client session after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: i32,
    pub username: String,
}

impl From<&User> for SessionIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}
