//! Credential-set endpoint: initial setup and self-service password reset.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::AppState;
use crate::session::token_from_request;
use crate::store::{password_key, ADMIN_PASS_KEY, BOOTSTRAP_USER};

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: SecretString,
}

fn default_username() -> String {
    BOOTSTRAP_USER.to_string()
}

/// Write a password into the key-value store.
///
/// The very first bootstrap write (no `admin_pass` yet) is open so the
/// installer can set the initial password; every later write requires an
/// authenticated session.
pub async fn register(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    if request.password.expose_secret().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 400,
                "message": "password is required",
                "data": null,
            })),
        )
            .into_response();
    }

    let installed = match state.kv.get(ADMIN_PASS_KEY).await {
        Ok(Some(pass)) if !pass.is_empty() => true,
        Ok(_) => false,
        Err(err) => {
            error!("Failed to read admin password key: {err}");
            return store_unavailable();
        }
    };

    if installed {
        let authenticated = token_from_request(&headers, &query)
            .and_then(|token| state.sessions.extract_identity(&token))
            .is_some();
        if !authenticated {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "code": 401,
                    "message": "authentication required",
                    "data": null,
                })),
            )
                .into_response();
        }
    }

    let key = password_key(&request.username);
    if let Err(err) = state.kv.set(&key, request.password.expose_secret()).await {
        error!("Failed to write password key: {err}");
        return store_unavailable();
    }

    info!(username = %request.username, "password updated");

    (
        StatusCode::OK,
        Json(json!({
            "code": 200,
            "message": "success",
            "data": null,
        })),
    )
        .into_response()
}

fn store_unavailable() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": 500,
            "message": "configuration store unavailable",
            "data": null,
        })),
    )
        .into_response()
}
