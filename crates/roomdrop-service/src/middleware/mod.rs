//! Middleware for the Roomdrop service.
//!
//! # Components
//!
//! - `auth` - Session authentication middleware for protected routes
//! - `http_metrics` - Request metrics capture for all responses

pub mod auth;
pub mod http_metrics;

pub use auth::{bearer_token, require_session, AuthState, CurrentUser};
pub use http_metrics::http_metrics_middleware;
