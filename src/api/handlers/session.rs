//! Session endpoints: current identity, refresh, logout.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{clear_session_cookie, cookie_headers, session_cookie};
use crate::api::AppState;
use crate::session::token_from_request;

/// Identity behind the presented session, 401 when there is none.
pub async fn login_user(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let identity = token_from_request(&headers, &query)
        .and_then(|token| state.sessions.extract_identity(&token));

    match identity {
        Some(username) => (
            StatusCode::OK,
            Json(json!({
                "code": 200,
                "message": "success",
                "data": { "username": username },
            })),
        )
            .into_response(),
        None => unauthorized(),
    }
}

pub async fn refresh_token(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(token) = token_from_request(&headers, &query) else {
        return unauthorized();
    };

    match state.sessions.refresh(&token) {
        Ok(session) => {
            let response_headers =
                cookie_headers(session_cookie(&session.token, session.max_age));
            (
                StatusCode::OK,
                response_headers,
                Json(json!({
                    "code": 200,
                    "message": "success",
                    "data": {
                        "token": session.token,
                        "expire_in": session.max_age.as_secs(),
                    },
                })),
            )
                .into_response()
        }
        Err(err) => {
            debug!("Session refresh rejected: {err}");
            unauthorized()
        }
    }
}

/// Revoke the session and clear the cookie, even when no session was found.
pub async fn logout(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Some(token) = token_from_request(&headers, &query) {
        state.sessions.revoke(&token);
    }

    let response_headers = cookie_headers(clear_session_cookie());
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "code": 401,
            "message": "session absent, malformed, or expired",
            "data": null,
        })),
    )
        .into_response()
}
