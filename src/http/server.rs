//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, rate limiting)
//! - Guard /admin routes behind bearer auth
//! - Bind the server to a listener

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::admin;
use crate::cache::CacheClient;
use crate::http::handlers::{self, ContextSource};
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheClient>,
    pub limiter: Arc<RateLimiter>,
    pub source: Arc<dyn ContextSource>,
    pub admin_api_key: Arc<str>,
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/v1/context/{user_id}", get(handlers::get_user_context))
        .route("/v1/reflections", post(handlers::create_reflection))
        .layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin/status", get(admin::handlers::get_status))
        .route("/admin/circuits", get(admin::handlers::get_circuits))
        .route("/admin/circuits/reset", post(admin::handlers::reset_circuits))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin::auth::admin_auth_middleware,
        ));

    Router::new()
        .merge(api)
        .merge(admin_routes)
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}

/// Serve the router on the given listener until the task is cancelled.
pub async fn run(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await
}

/// Tag every request and its response with a UUID for log correlation.
async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let value = match HeaderValue::from_str(&id) {
        Ok(value) => value,
        Err(_) => HeaderValue::from_static("invalid"),
    };
    request.headers_mut().insert(X_REQUEST_ID, value.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(X_REQUEST_ID, value);
    response
}
