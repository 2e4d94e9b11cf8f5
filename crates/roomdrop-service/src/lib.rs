//! Roomdrop Service Library
//!
//! This library provides the HTTP surface for Roomdrop - a short-lived,
//! password-protected file drop service:
//!
//! - Account signup and bearer-token sessions
//! - Room creation, code/password join, and fixed 30 minute expiry
//! - Multipart file upload into rooms and public download by locator
//!
//! # Architecture
//!
//! The service follows a Handler -> Component -> Store pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> roomdrop_core components -> stores
//! ```
//!
//! # Modules
//!
//! - `blobs` - Stored file content (disk-backed)
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Session authentication and HTTP metrics
//! - `models` - Request/response models
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup

pub mod blobs;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
