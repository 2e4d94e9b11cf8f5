//! # Roomdrop Test Utilities
//!
//! Shared test utilities for the Roomdrop service.
//!
//! This crate provides:
//! - Server test harness (`TestServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roomdrop_test_utils::TestServer;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestServer::spawn().await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .get(format!("{}/health", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
