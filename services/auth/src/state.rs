//! Application state shared across handlers

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{service::AuthService, session::SessionCookies};

/// Application state shared across handlers
///
/// Built once at startup; handlers receive it through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub session_cookies: SessionCookies,
    cookie_key: Key,
}

impl AppState {
    /// Assemble the state, deriving the cookie signing key from `secret`
    ///
    /// `secret` must be at least 32 bytes; [`crate::config::AppConfig`]
    /// enforces that at load time.
    pub fn new(auth_service: AuthService, secret: &[u8], secure_cookies: bool) -> Self {
        Self {
            auth_service,
            session_cookies: SessionCookies::new(secure_cookies),
            cookie_key: Key::derive_from(secret),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
