//! Rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware.rs (derive caller identifier from headers)
//!     → limiter.rs (breaker-guarded check, fail closed)
//!     → window.rs (Redis fixed-window primitive, swappable)
//!     → Allowed: handler runs, response gains rate-limit headers
//!     → Denied: 429 with Retry-After, handler never runs
//! ```
//!
//! # Design Decisions
//! - Fail closed: a limiter outage denies traffic; silently unlimited
//!   traffic is the one outcome this layer must never produce
//! - Pass-through mode (no primitive configured) is an explicit choice,
//!   not a failure mode

pub mod limiter;
pub mod middleware;
pub mod window;

pub use limiter::{LimitDecision, LimiterBackend, RateLimitResult, RateLimiter};
pub use middleware::{client_identifier, rate_limit_middleware};
pub use window::FixedWindowLimiter;
