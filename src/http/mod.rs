//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (router, request ID, trace, timeout)
//!     → rate_limit middleware (429 on denial)
//!     → handlers.rs (cache-aside over the source of truth)
//! ```

pub mod handlers;
pub mod server;

pub use handlers::{ContextSource, MemoryContextSource};
pub use server::{build_router, run, AppState};
