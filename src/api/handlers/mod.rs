//! Request handlers and shared helpers.

pub mod check;
pub mod health;
pub mod login;
pub mod register;
pub mod session;

use axum::http::{
    header::{InvalidHeaderValue, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use std::net::SocketAddr;
use std::time::Duration;

use crate::session::SESSION_COOKIE_NAME;

/// Normalize the originating address used to key lockout state.
///
/// Behind a local reverse proxy the peer address is loopback; the proxy's
/// `X-Real-IP` header then carries the real client.
pub(crate) fn client_identifier(addr: SocketAddr, headers: &HeaderMap) -> String {
    let ip = addr.ip();
    if ip.is_loopback() {
        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            return real_ip.to_string();
        }
    }
    ip.to_string()
}

/// Build the `HttpOnly` cookie for a freshly minted or refreshed session.
pub(crate) fn session_cookie(
    token: &str,
    max_age: Duration,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = max_age.as_secs();
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    ))
}

pub(crate) fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}

/// Headers carrying a `Set-Cookie`, tolerating an unencodable token by
/// sending no cookie at all (the body still carries the bearer token).
pub(crate) fn cookie_headers(cookie: Result<HeaderValue, InvalidHeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = cookie {
        headers.insert(SET_COOKIE, value);
    }
    headers
}
