//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check cross-section consistency (rate limiting requires Redis)
//! - Validate value ranges (windows and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServiceConfig → Result<(), Vec<_>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{BreakerConfig, ServiceConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    RateLimitWithoutRedis,
    ZeroWindow,
    ZeroMaxRequests,
    ZeroFailureThreshold(&'static str),
    ZeroRecoveryTimeout(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr}")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a socket address: {addr}")
            }
            ValidationError::RateLimitWithoutRedis => {
                write!(f, "rate_limit.enabled requires redis.url")
            }
            ValidationError::ZeroWindow => write!(f, "rate_limit.window_secs must be > 0"),
            ValidationError::ZeroMaxRequests => write!(f, "rate_limit.max_requests must be > 0"),
            ValidationError::ZeroFailureThreshold(section) => {
                write!(f, "{section}.breaker.failure_threshold must be > 0")
            }
            ValidationError::ZeroRecoveryTimeout(section) => {
                write!(f, "{section}.breaker.recovery_timeout_ms must be > 0")
            }
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.rate_limit.enabled {
        if config.redis.url.is_none() {
            errors.push(ValidationError::RateLimitWithoutRedis);
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::ZeroWindow);
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroMaxRequests);
        }
    }

    validate_breaker(&config.cache.breaker, "cache", &mut errors);
    validate_breaker(&config.rate_limit.breaker, "rate_limit", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_breaker(
    breaker: &BreakerConfig,
    section: &'static str,
    errors: &mut Vec<ValidationError>,
) {
    if breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold(section));
    }
    if breaker.recovery_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRecoveryTimeout(section));
    }
}
