//! Cookie-backed session and flash messages
//!
//! The session lives entirely client-side in a cookie signed by
//! [`SignedCookieJar`]; the server keeps no session table. Payloads are JSON,
//! base64url-encoded so they stay valid cookie values.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::models::SessionIdentity;

/// Cookie holding the logged-in identity
pub const SESSION_COOKIE: &str = "session";

/// Cookie holding messages queued for the next rendered page
pub const FLASH_COOKIE: &str = "flash";

fn encode<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_vec(value)
        .ok()
        .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Session cookie policy
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookies {
    /// Emit the `Secure` attribute
    pub secure: bool,
}

impl SessionCookies {
    /// Create a cookie policy
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    fn removal(name: &'static str) -> Cookie<'static> {
        Cookie::build(name).path("/").build()
    }

    /// Identity stored by a previous login, if any
    ///
    /// Tampered or undecodable cookies read as "no session".
    pub fn identity(&self, jar: &SignedCookieJar) -> Option<SessionIdentity> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| decode(cookie.value()))
    }

    /// Store the identity of a freshly logged-in user
    pub fn establish(&self, jar: SignedCookieJar, identity: &SessionIdentity) -> SignedCookieJar {
        match encode(identity) {
            Some(value) => {
                debug!("Establishing session for user id {}", identity.user_id);
                jar.add(self.cookie(SESSION_COOKIE, value))
            }
            None => jar,
        }
    }

    /// Drop the session identity; a no-op when there is none
    pub fn clear(&self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Self::removal(SESSION_COOKIE))
    }

    /// Queue a message for the next rendered page
    pub fn flash(&self, jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
        let mut messages = self.peek_flashes(&jar);
        messages.push(message.into());

        match encode(&messages) {
            Some(value) => jar.add(self.cookie(FLASH_COOKIE, value)),
            None => jar,
        }
    }

    /// Pending messages, without consuming them
    pub fn peek_flashes(&self, jar: &SignedCookieJar) -> Vec<String> {
        jar.get(FLASH_COOKIE)
            .and_then(|cookie| decode(cookie.value()))
            .unwrap_or_default()
    }

    /// Pending messages, removing them so they are shown once
    pub fn take_flashes(&self, jar: SignedCookieJar) -> (SignedCookieJar, Vec<String>) {
        let messages = self.peek_flashes(&jar);
        if messages.is_empty() {
            return (jar, messages);
        }

        (jar.remove(Self::removal(FLASH_COOKIE)), messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::generate())
    }

    fn alice() -> SessionIdentity {
        SessionIdentity {
            user_id: 1,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn establish_then_read_identity() {
        let cookies = SessionCookies::default();
        let jar = cookies.establish(jar(), &alice());

        assert_eq!(cookies.identity(&jar), Some(alice()));
    }

    #[test]
    fn clear_removes_identity_even_when_absent() {
        let cookies = SessionCookies::default();

        let jar = cookies.clear(jar());
        assert_eq!(cookies.identity(&jar), None);

        let jar = cookies.establish(jar, &alice());
        let jar = cookies.clear(jar);
        assert_eq!(cookies.identity(&jar), None);
    }

    #[test]
    fn flashes_accumulate_and_are_consumed_once() {
        let cookies = SessionCookies::default();
        let jar = cookies.flash(jar(), "first");
        let jar = cookies.flash(jar, "second, with punctuation; and quotes \"!\"");

        let (jar, messages) = cookies.take_flashes(jar);
        assert_eq!(
            messages,
            vec![
                "first".to_string(),
                "second, with punctuation; and quotes \"!\"".to_string()
            ]
        );

        let (_, messages) = cookies.take_flashes(jar);
        assert!(messages.is_empty());
    }

    #[test]
    fn session_cookie_attributes() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.establish(jar(), &alice());
        let cookie = jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
    }
}
