//! HTTP request handlers for the Roomdrop service.

pub mod auth;
pub mod files;
pub mod health;
pub mod metrics;
pub mod rooms;

pub use auth::{get_me, login, logout, signup};
pub use files::{download_file, upload_files};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use rooms::{create_room, get_room, join_room};
