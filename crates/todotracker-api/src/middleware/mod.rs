//! HTTP middleware: API key authentication, rate limiting, CORS.

pub mod auth;
pub mod cors;
pub mod rate_limit;
