//! Derived-data caching subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler
//!     → keys.rs (namespaced key + TTL for the category)
//!     → client.rs (breaker-guarded store call, fail open)
//!     → On miss/outage: handler falls back to the database of record
//! ```
//!
//! # Design Decisions
//! - Fail open: a cache outage degrades latency, never correctness
//! - TTLs are fixed per category, not per call site

pub mod client;
pub mod keys;

pub use client::CacheClient;
pub use keys::{user_context_keys, CacheCategory, DEFAULT_TTL_SECS, KEY_PREFIX};
