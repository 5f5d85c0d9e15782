//! HTTP surface: router wiring and server startup.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::auth::{AuthenticationGate, CredentialVerifier, LockoutLedger};
use crate::session::{BearerSessions, SessionBoundary};
use crate::store::postgres::{ensure_schema, PgKvStore, PgUserStore};
use crate::store::KvStore;

pub mod handlers;

/// Shared state injected into every handler.
pub struct AppState {
    pub gate: AuthenticationGate,
    pub sessions: Arc<dyn SessionBoundary>,
    pub kv: Arc<dyn KvStore>,
}

/// Build the application router around the given state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/check", get(handlers::check::check))
        .route("/auth/login", post(handlers::login::login))
        .route("/auth/register", post(handlers::register::register))
        .route("/auth/reset_pass", post(handlers::register::register))
        .route("/auth/loginUser", get(handlers::session::login_user))
        .route("/auth/refresh_token", post(handlers::session::refresh_token))
        .route("/auth/logout", post(handlers::session::logout))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, session_timeout: Duration) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    ensure_schema(&pool)
        .await
        .context("Failed to prepare database schema")?;

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let kv: Arc<dyn KvStore> = Arc::new(PgKvStore::new(pool));

    let gate = AuthenticationGate::new(
        LockoutLedger::new(),
        CredentialVerifier::new(users, kv.clone()),
    );
    let sessions: Arc<dyn SessionBoundary> = Arc::new(BearerSessions::new(session_timeout));

    let state = Arc::new(AppState { gate, sessions, kv });
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
