//! Session boundary: turning an accepted login into a bearer session.
//!
//! The gate never constructs or parses tokens itself; it talks to a
//! [`SessionBoundary`] implementor. [`bearer::BearerSessions`] is the bundled
//! issuer, an in-memory table of hashed opaque tokens.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::collections::HashMap;
use std::time::Duration;

pub mod bearer;

pub use bearer::BearerSessions;

/// Cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "wicket_session";

/// Query parameter carrying the session token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// A minted session handed back to the transport layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Raw bearer token; only ever sent to the client.
    pub token: String,
    /// Remaining validity, used for the cookie `Max-Age`.
    pub max_age: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session not found or expired")]
    Invalid,
    #[error("session outside its renewal window")]
    OutsideRenewalWindow,
}

/// Contract the authentication core depends on for sessions.
pub trait SessionBoundary: Send + Sync {
    /// Mint a session encoding the verified identity.
    fn issue(&self, identity: &str) -> Session;

    /// Resolve a presented token to the identity it encodes.
    ///
    /// Returns `None` for absent, unknown, or expired tokens.
    fn extract_identity(&self, token: &str) -> Option<String>;

    /// Extend a live session inside its renewal window.
    ///
    /// # Errors
    /// Fails for unknown or expired tokens, and for sessions past their
    /// renewal window.
    fn refresh(&self, token: &str) -> Result<Session, SessionError>;

    /// Invalidate the session backing the token.
    fn revoke(&self, token: &str);

    /// Authorization hook per authenticated request. Every accepted identity
    /// is an administrator here, so the default permits everything.
    fn authorize(&self, _identity: &str) -> bool {
        true
    }
}

/// Pull the bearer token out of a request.
///
/// Lookup order: `Authorization` header, `token` query parameter, session
/// cookie.
#[must_use]
pub fn token_from_request(
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Option<String> {
    if let Some(token) = bearer_header_token(headers) {
        return Some(token);
    }
    if let Some(token) = query.get(TOKEN_QUERY_PARAM) {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    cookie_token(headers)
}

fn bearer_header_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).expect("header value"));
        }
        headers
    }

    #[test]
    fn bearer_header_wins_over_query_and_cookie() {
        let headers = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "wicket_session=from-cookie"),
        ]);
        let mut query = HashMap::new();
        query.insert(TOKEN_QUERY_PARAM.to_string(), "from-query".to_string());
        assert_eq!(
            token_from_request(&headers, &query),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn query_wins_over_cookie() {
        let headers = headers(&[("cookie", "wicket_session=from-cookie")]);
        let mut query = HashMap::new();
        query.insert(TOKEN_QUERY_PARAM.to_string(), "from-query".to_string());
        assert_eq!(
            token_from_request(&headers, &query),
            Some("from-query".to_string())
        );
    }

    #[test]
    fn cookie_is_the_fallback() {
        let headers = headers(&[("cookie", "other=1; wicket_session=from-cookie")]);
        assert_eq!(
            token_from_request(&headers, &HashMap::new()),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(token_from_request(&HeaderMap::new(), &HashMap::new()), None);
    }

    #[test]
    fn empty_bearer_header_is_ignored() {
        let headers = headers(&[("authorization", "Bearer ")]);
        assert_eq!(token_from_request(&headers, &HashMap::new()), None);
    }
}
