//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to remote store/limiter:
//!     → client checks circuit_breaker.rs (fail fast while open)
//!     → On success/failure: outcome recorded against the breaker
//!     → Threshold breach opens the circuit for the recovery timeout
//! ```
//!
//! # Design Decisions
//! - The breaker is pure bookkeeping; what a denied call means is decided
//!   by the owning client (cache falls back, limiter denies)
//! - No additional timeouts here; a slow remote call is not a failure

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitStatus};
