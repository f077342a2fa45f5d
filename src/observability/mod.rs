//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters for cache, limiter, circuit transitions)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Log severity encodes user impact: cache faults warn (silent
//!   degradation), limiter faults error (users are being denied)
//! - Metrics are cheap counter increments, safe on the request path

pub mod logging;
pub mod metrics;
