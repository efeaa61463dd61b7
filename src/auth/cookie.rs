//! Session cookie parsing and formatting.

use axum::http::{HeaderMap, header};

/// Cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Extract a cookie value from the Cookie header(s).
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Attributes shared by every session cookie the server emits.
///
/// Setting and clearing must use identical attributes, otherwise the browser
/// keeps the old cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    /// Add the `Secure` attribute (production mode).
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// `Set-Cookie` value carrying a session token.
    pub fn session_cookie(&self, token: &str, max_age: u64) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            SESSION_COOKIE_NAME,
            token,
            max_age,
            self.secure_suffix()
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn cleared_session_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}",
            SESSION_COOKIE_NAME,
            self.secure_suffix()
        )
    }

    fn secure_suffix(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }
}
