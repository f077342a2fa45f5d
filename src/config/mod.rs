//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → consumed once at startup to build clients
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, BreakerConfig, CacheConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    RedisConfig, ServiceConfig,
};

use std::time::Duration;

use crate::resilience::CircuitBreakerConfig;

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            recovery_timeout: Duration::from_millis(config.recovery_timeout_ms),
        }
    }
}
