//! Session cookie helper.
//!
//! The browser frontend authenticates with an HttpOnly `token` cookie that
//! carries the same JWT API clients send as a Bearer token.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Builds, reads and clears the session cookie.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    secure: bool,
    max_age_secs: i64,
}

impl CookieHelper {
    pub fn new(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age_secs,
        }
    }

    /// Build a Set-Cookie header value carrying the session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME, token, self.max_age_secs
        );
        self.with_attributes(cookie)
    }

    /// Build a Set-Cookie header value that removes the session cookie.
    pub fn build_clear_cookie(&self) -> String {
        let cookie = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            SESSION_COOKIE_NAME
        );
        self.with_attributes(cookie)
    }

    /// Append the session cookie to response headers.
    pub fn add_session_cookie(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.build_session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Append a clearing cookie to response headers (logout).
    pub fn add_clear_cookie(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build_clear_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a cookie value from request headers by name.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (cookie_name, cookie_value) = cookie.split_once('=')?;
            (cookie_name == name && !cookie_value.is_empty()).then_some(cookie_value)
        })
}

/// Session token from the `token` cookie, if present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    extract_cookie(headers, SESSION_COOKIE_NAME)
}
