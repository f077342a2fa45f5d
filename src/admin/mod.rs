//! Admin surface: authenticated circuit status and reset endpoints.

pub mod auth;
pub mod handlers;
