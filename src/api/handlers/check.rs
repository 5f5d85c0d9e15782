//! Bootstrap check: has the administrator password ever been set?

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::api::AppState;
use crate::store::{ADMIN_PASS_KEY, LOGIN_TITLE_KEY};

const DEFAULT_TITLE: &str = "wicket admin console";

pub async fn check(state: Extension<Arc<AppState>>) -> impl IntoResponse {
    let installed = match state.kv.get(ADMIN_PASS_KEY).await {
        Ok(Some(pass)) if !pass.is_empty() => true,
        Ok(_) => false,
        Err(err) => {
            error!("Failed to read admin password key: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "code": 500,
                    "message": "configuration store unavailable",
                    "data": null,
                })),
            )
                .into_response();
        }
    };

    if !installed {
        return (
            StatusCode::CREATED,
            Json(json!({
                "code": 201,
                "message": "administrator account not configured",
                "data": null,
            })),
        )
            .into_response();
    }

    // A missing title is not an error; fall back to the default.
    let title = match state.kv.get(LOGIN_TITLE_KEY).await {
        Ok(Some(title)) if !title.is_empty() => title,
        _ => DEFAULT_TITLE.to_string(),
    };

    (
        StatusCode::OK,
        Json(json!({
            "code": 200,
            "message": "success",
            "data": { "title": title },
        })),
    )
        .into_response()
}
