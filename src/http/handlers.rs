//! Request handlers for the journaling API surface.
//!
//! The database of record is an external collaborator; handlers see it
//! only through the [`ContextSource`] trait and use the cache client
//! cache-aside around it.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::Deserialize;

use crate::cache::CacheCategory;
use crate::http::server::AppState;

/// Source of truth for derived user context.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Load the derived context for a user, or `None` if unknown.
    async fn load_user_context(&self, user_id: &str) -> Option<serde_json::Value>;

    /// Persist a reflection for a user.
    async fn save_reflection(&self, user_id: &str, body: &str);
}

/// In-memory source used by the binary and tests.
#[derive(Default)]
pub struct MemoryContextSource {
    contexts: DashMap<String, serde_json::Value>,
    reflections: DashMap<String, Vec<String>>,
}

impl MemoryContextSource {
    pub fn with_context(self, user_id: &str, context: serde_json::Value) -> Self {
        self.contexts.insert(user_id.to_string(), context);
        self
    }
}

#[async_trait]
impl ContextSource for MemoryContextSource {
    async fn load_user_context(&self, user_id: &str) -> Option<serde_json::Value> {
        self.contexts.get(user_id).map(|e| e.value().clone())
    }

    async fn save_reflection(&self, user_id: &str, body: &str) {
        self.reflections
            .entry(user_id.to_string())
            .or_default()
            .push(body.to_string());
    }
}

/// Cache-aside read of derived user context for `GET /v1/context/{user_id}`.
pub async fn get_user_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    let key = CacheCategory::UserContext.key(&user_id);

    if let Some(context) = state.cache.get::<serde_json::Value>(&key).await {
        return Json(context).into_response();
    }

    match state.source.load_user_context(&user_id).await {
        Some(context) => {
            state
                .cache
                .set(&key, &context, Some(CacheCategory::UserContext.ttl_secs()))
                .await;
            Json(context).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewReflection {
    pub user_id: String,
    pub body: String,
}

/// Store a reflection and invalidate every cached category for the user,
/// serving `POST /v1/reflections`.
pub async fn create_reflection(
    State(state): State<AppState>,
    Json(reflection): Json<NewReflection>,
) -> StatusCode {
    state
        .source
        .save_reflection(&reflection.user_id, &reflection.body)
        .await;
    state.cache.delete_user_context(&reflection.user_id).await;
    StatusCode::CREATED
}

/// Liveness endpoint with cache visibility, serving `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "cache_enabled": state.cache.is_enabled(),
    }))
}
