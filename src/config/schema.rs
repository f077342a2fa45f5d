//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files,
//! with defaults so a minimal (or absent) config file still boots a
//! working service: cache enabled when Redis is configured, rate limiting
//! off, admin surface locked.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Remote key-value store connection.
    pub redis: RedisConfig,

    /// Cache client and its circuit breaker.
    pub cache: CacheConfig,

    /// Rate limiter, its window, and its circuit breaker.
    pub rate_limit: RateLimitConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Remote store connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL (e.g., "redis://localhost:6379"). Absent means no
    /// remote store: caching degrades to no-op, rate limiting cannot be
    /// enabled.
    pub url: Option<String>,
}

/// Circuit breaker tuning shared by both clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Milliseconds the circuit stays open before a probe is allowed.
    pub recovery_timeout_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout_ms: 15_000,
        }
    }
}

/// Cache client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the cache client (requires redis.url).
    pub enabled: bool,

    /// Circuit breaker tuning for the cache client.
    pub breaker: BreakerConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            breaker: BreakerConfig::default(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting (requires redis.url).
    pub enabled: bool,

    /// Maximum requests per window per identifier.
    pub max_requests: u64,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Circuit breaker tuning for the limiter client.
    pub breaker: BreakerConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_requests: 60,
            window_secs: 60,
            breaker: BreakerConfig::default(),
        }
    }
}

/// Admin endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token for /admin routes. Empty disables the admin surface.
    pub api_key: String,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
