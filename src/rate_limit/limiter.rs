//! Fail-closed rate limiter.
//!
//! # Responsibilities
//! - Wrap the limiter primitive behind the fail-closed policy
//! - Record every remote outcome against the owned circuit breaker
//! - Surface infrastructure failure as denial, never as silence
//!
//! # Design Decisions
//! - No primitive configured is deliberate pass-through (protection
//!   disabled), distinct from an unavailable primitive which must deny
//! - An over-limit decision from the primitive is a legitimate denial and
//!   counts as a breaker success
//! - Denials caused by infrastructure carry `circuit_open` so callers can
//!   tell them apart from limit exhaustion

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::resilience::{CircuitBreaker, CircuitStatus};
use crate::store::StoreError;

/// Decision produced by the underlying limiter primitive.
#[derive(Debug, Clone, Copy)]
pub struct LimitDecision {
    pub success: bool,
    pub remaining: u64,
    /// Unix epoch milliseconds at which the current window resets.
    pub reset: u64,
}

/// Limiter primitive interface. The windowing algorithm lives behind this
/// seam; the resilience layer only cares that it can fail.
#[async_trait]
pub trait LimiterBackend: Send + Sync {
    async fn limit(&self, identifier: &str) -> Result<LimitDecision, StoreError>;
}

/// Outcome of a rate-limit check as seen by the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    /// Set when the denial comes from limiter infrastructure being down
    /// rather than the caller exceeding its limit.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub circuit_open: bool,
}

impl RateLimitResult {
    /// Unconditional allow, used in pass-through mode.
    pub fn allow() -> Self {
        Self {
            success: true,
            remaining: None,
            reset: None,
            circuit_open: false,
        }
    }

    /// Denial caused by limiter infrastructure, not by the caller.
    pub fn deny_unavailable() -> Self {
        Self {
            success: false,
            remaining: None,
            reset: None,
            circuit_open: true,
        }
    }
}

/// Circuit-breaker-guarded client for the limiter primitive.
pub struct RateLimiter {
    backend: Option<Arc<dyn LimiterBackend>>,
    breaker: CircuitBreaker,
}

impl RateLimiter {
    pub fn new(backend: Option<Arc<dyn LimiterBackend>>, breaker: CircuitBreaker) -> Self {
        if backend.is_none() {
            tracing::info!("Rate limiter not configured, requests pass through");
        }
        Self { backend, breaker }
    }

    /// Check whether a caller may proceed.
    ///
    /// Fail-closed: while the breaker is open, or when the primitive
    /// errors, the request is denied with `circuit_open` set.
    pub async fn check_limit(&self, identifier: &str) -> RateLimitResult {
        let Some(backend) = self.backend.as_ref() else {
            tracing::debug!(identifier = %identifier, "Rate limiter not configured, allowing");
            return RateLimitResult::allow();
        };

        if self.breaker.is_open() {
            tracing::debug!(identifier = %identifier, "Rate limiter circuit open, denying");
            return RateLimitResult::deny_unavailable();
        }

        match backend.limit(identifier).await {
            Ok(decision) => {
                self.breaker.record_success();
                RateLimitResult {
                    success: decision.success,
                    remaining: Some(decision.remaining),
                    reset: Some(decision.reset),
                    circuit_open: false,
                }
            }
            Err(e) => {
                self.breaker.record_failure();
                tracing::error!(
                    identifier = %identifier,
                    error = %e,
                    "Rate limit check failed, denying request"
                );
                RateLimitResult::deny_unavailable()
            }
        }
    }

    pub fn circuit_status(&self) -> CircuitStatus {
        self.breaker.status()
    }

    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }
}
