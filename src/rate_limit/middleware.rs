//! Rate limiting middleware.
//!
//! Derives a caller identifier from request metadata, checks the limiter,
//! and converts denial into a 429 with retry metadata. Allowed requests
//! pass through with rate-limit headers added to the handler's response.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::limiter::RateLimiter;
use crate::observability::metrics;

const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Fallback Retry-After when the limiter gave no reset time.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Derive the caller identifier: first entry of `x-forwarded-for`, else
/// `x-real-ip`, else `"unknown"`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

/// Middleware guarding a route with the rate limiter.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identifier = client_identifier(request.headers());
    let result = limiter.check_limit(&identifier).await;

    if !result.success {
        let reason = if result.circuit_open {
            "circuit_open"
        } else {
            "limit_exceeded"
        };
        tracing::warn!(client = %identifier, reason, "Request rejected by rate limiter");
        metrics::record_rate_limited(reason);

        let retry_after = retry_after_secs(result.reset);
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate limit exceeded",
                "retry_after_secs": retry_after,
            })),
        )
            .into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u64));
        return response;
    }

    let mut response = next.run(request).await;
    if let (Some(remaining), Some(reset)) = (result.remaining, result.reset) {
        let headers = response.headers_mut();
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset));
    }
    response
}

/// Seconds until the window resets, rounded up; defaults when the limiter
/// gave no reset timestamp.
fn retry_after_secs(reset_ms: Option<u64>) -> u64 {
    let Some(reset_ms) = reset_ms else {
        return DEFAULT_RETRY_AFTER_SECS;
    };
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    reset_ms.saturating_sub(now_ms).div_ceil(1000)
}
