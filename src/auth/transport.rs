//! Moving the session token between client and server.
//!
//! Inbound, the session cookie wins over an `Authorization: Bearer` header so
//! header-based clients keep working while browsers use the cookie.

use axum::http::{HeaderMap, HeaderValue, header, header::InvalidHeaderValue};

use super::cookie::{CookieSettings, SESSION_COOKIE_NAME, get_cookie};

/// Find the candidate session token of a request, cookie first.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    match get_cookie(headers, SESSION_COOKIE_NAME) {
        Some(token) if !token.is_empty() => Some(token),
        _ => bearer_token(headers),
    }
}

/// Parse `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Add a `Set-Cookie` header carrying the session token.
pub fn attach(
    headers: &mut HeaderMap,
    settings: CookieSettings,
    token: &str,
    ttl: u64,
) -> Result<(), InvalidHeaderValue> {
    append_set_cookie(headers, &settings.session_cookie(token, ttl))
}

/// Add a `Set-Cookie` header that removes the session cookie.
pub fn clear(headers: &mut HeaderMap, settings: CookieSettings) -> Result<(), InvalidHeaderValue> {
    append_set_cookie(headers, &settings.cleared_session_cookie())
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) -> Result<(), InvalidHeaderValue> {
    headers.append(header::SET_COOKIE, HeaderValue::from_str(cookie)?);
    Ok(())
}
