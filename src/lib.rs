//! Lucid resilience layer.
//!
//! Circuit-breaker-guarded clients for the remote key-value store that
//! the lucid journaling service depends on for two unrelated purposes:
//! caching derived user context (fail open) and rate limiting inbound
//! requests (fail closed). One breaker primitive, two opposite safety
//! policies.

pub mod admin;
pub mod cache;
pub mod config;
pub mod http;
pub mod observability;
pub mod rate_limit;
pub mod resilience;
pub mod store;

pub use cache::{CacheCategory, CacheClient};
pub use config::ServiceConfig;
pub use http::{AppState, ContextSource, MemoryContextSource};
pub use rate_limit::{RateLimitResult, RateLimiter};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitStatus};
