//! Login endpoint: the gate decides, the session boundary mints.

use axum::{
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::error;

use super::{client_identifier, cookie_headers, session_cookie};
use crate::api::AppState;
use crate::auth::LoginOutcome;
use crate::store::BOOTSTRAP_USER;

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: SecretString,
}

fn default_username() -> String {
    BOOTSTRAP_USER.to_string()
}

pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let identifier = client_identifier(addr, &headers);

    let outcome = match state
        .gate
        .login(&identifier, &request.username, request.password.expose_secret())
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Login backend failure: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "code": 500,
                    "message": "authentication backend unavailable",
                    "data": null,
                })),
            )
                .into_response();
        }
    };

    match outcome {
        LoginOutcome::Accepted(identity) => {
            if !state.sessions.authorize(&identity) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "code": 403,
                        "message": "identity is not permitted",
                        "data": null,
                    })),
                )
                    .into_response();
            }
            let session = state.sessions.issue(&identity);
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
        LoginOutcome::NotInstalled => (
            StatusCode::CREATED,
            Json(json!({
                "code": 201,
                "message": outcome.message(),
                "data": null,
            })),
        )
            .into_response(),
        LoginOutcome::RejectedBadInput => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 400,
                "message": outcome.message(),
                "data": null,
            })),
        )
            .into_response(),
        LoginOutcome::RejectedWithRemaining(_) | LoginOutcome::RejectedLocked => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "code": 401,
                "message": outcome.message(),
                "data": null,
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_defaults_to_bootstrap_identity() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"password":"s3cret"}"#).expect("deserialize");
        assert_eq!(request.username, "admin");
        assert_eq!(request.password.expose_secret(), "s3cret");
    }

    #[test]
    fn missing_password_deserializes_empty() {
        let request: LoginRequest = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(request.password.expose_secret(), "");
    }
}
